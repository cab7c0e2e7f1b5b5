use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::{config::CascadeConfig, preview::DEFAULT_PREVIEW_ROWS, storage::DEFAULT_STORE_DIR};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Ingest CSV and spreadsheet uploads and summarize their columns",
    long_about = None
)]
pub struct Cli {
    /// Directory holding uploaded files
    #[arg(
        long = "store-dir",
        global = true,
        env = "TABULAR_DIGEST_STORE",
        default_value = DEFAULT_STORE_DIR
    )]
    pub store_dir: PathBuf,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Store a .csv/.xlsx/.xls file and print a preview of its contents
    Upload(UploadArgs),
    /// List stored files
    Files,
    /// Show the first rows of a stored file
    Preview(PreviewArgs),
    /// Summarize column types, missing values, and numeric statistics
    Summary(SummaryArgs),
    /// Remove a stored file
    Delete(DeleteArgs),
    /// Report how a local file would be decoded without storing it
    Inspect(InspectArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

/// Cascade tuning shared by every command that parses a file.
#[derive(Debug, Clone, Args)]
pub struct CascadeArgs {
    /// Bytes of decoded text handed to the dialect sniffer
    #[arg(long = "sniff-bytes", default_value_t = crate::sniff::DEFAULT_SAMPLE_BYTES)]
    pub sniff_bytes: usize,
    /// Lines sampled when guessing the delimiter
    #[arg(long = "sample-lines", default_value_t = crate::delimiter::DEFAULT_SAMPLE_LINES)]
    pub sample_lines: usize,
    /// Fail instead of falling back to plain line splitting
    #[arg(long = "no-manual-fallback")]
    pub no_manual_fallback: bool,
}

impl CascadeArgs {
    pub fn to_config(&self) -> CascadeConfig {
        CascadeConfig {
            sniff_sample_bytes: self.sniff_bytes,
            delimiter_sample_lines: self.sample_lines,
            manual_fallback: !self.no_manual_fallback,
            ..CascadeConfig::default()
        }
    }
}

#[derive(Debug, Args)]
pub struct UploadArgs {
    /// File to upload
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Number of rows included in the preview
    #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS)]
    pub rows: usize,
    #[command(flatten)]
    pub cascade: CascadeArgs,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Stored file name as printed by `upload` or `files`
    pub name: String,
    /// Number of rows to display
    #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS)]
    pub rows: usize,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
    #[command(flatten)]
    pub cascade: CascadeArgs,
}

#[derive(Debug, Args)]
pub struct SummaryArgs {
    /// Stored file name as printed by `upload` or `files`
    pub name: String,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
    /// Include sample categorical values and example rows
    #[arg(long)]
    pub facts: bool,
    #[command(flatten)]
    pub cascade: CascadeArgs,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Stored file name to remove
    pub name: String,
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Local file to decode
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
    #[command(flatten)]
    pub cascade: CascadeArgs,
}
