pub mod cascade;
pub mod cli;
pub mod config;
pub mod context;
pub mod data;
pub mod delimiter;
pub mod encoding;
pub mod error;
pub mod ingest;
pub mod io_utils;
pub mod preview;
pub mod schema;
pub mod sniff;
pub mod spreadsheet;
pub mod stats;
pub mod storage;
pub mod table;

pub use cascade::{ParseOutcome, ParsedTable, StageFailure, Strategy, TableParser};
pub use config::{CascadeConfig, IngestConfig};
pub use context::PromptFacts;
pub use error::{ErrorClass, FormatIssue, IngestError, StructuralError};
pub use ingest::{FileFormat, Ingested, Ingestor, RawFile};
pub use preview::FilePreview;
pub use schema::{ColumnKind, TableSummary};
pub use storage::{DirStore, FileStore};
pub use table::Table;

use std::{env, fs, path::Path, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info};
use serde::Serialize;

use crate::cli::{Cli, Commands, OutputFormat};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("tabular_digest", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let store = DirStore::new(&cli.store_dir);
    debug!("Using store directory {:?}", store.root());
    match cli.command {
        Commands::Upload(args) => handle_upload(&store, &args),
        Commands::Files => handle_files(&store),
        Commands::Preview(args) => handle_preview(&store, &args),
        Commands::Summary(args) => handle_summary(&store, &args),
        Commands::Delete(args) => handle_delete(&store, &args),
        Commands::Inspect(args) => handle_inspect(&args),
    }
}

fn handle_upload(store: &DirStore, args: &cli::UploadArgs) -> Result<()> {
    let config = IngestConfig {
        cascade: args.cascade.to_config(),
        preview_rows: args.rows,
    };
    let raw = read_local(&args.input)?;
    let ingested = Ingestor::new(&config)
        .ingest(&raw)
        .with_context(|| format!("Parsing upload {:?}", args.input))?;
    let stored = store
        .save(&raw.bytes, &raw.name)
        .with_context(|| format!("Saving upload into {:?}", store.root()))?;
    let payload = FilePreview::new(stored, &ingested.table, config.preview_rows);
    print_structured(&payload, OutputFormat::Json)?;
    info!(
        "Stored '{}' ({} row(s), {} column(s)) via {} stage",
        payload.filename, payload.rows, payload.columns, ingested.outcome.strategy
    );
    Ok(())
}

fn handle_files(store: &DirStore) -> Result<()> {
    let names = store
        .list()
        .with_context(|| format!("Listing {:?}", store.root()))?;
    for name in &names {
        println!("{name}");
    }
    info!("Listed {} stored file(s)", names.len());
    Ok(())
}

fn handle_preview(store: &DirStore, args: &cli::PreviewArgs) -> Result<()> {
    let config = IngestConfig {
        cascade: args.cascade.to_config(),
        preview_rows: args.rows,
    };
    let ingested = Ingestor::new(&config)
        .load(store, &args.name)
        .with_context(|| format!("Loading '{}'", args.name))?;
    let payload = FilePreview::new(args.name.clone(), &ingested.table, config.preview_rows);
    match args.format {
        OutputFormat::Table => {
            table::print_table(&payload.column_names, &payload.render_rows());
        }
        format => print_structured(&payload, format)?,
    }
    info!(
        "Displayed {} of {} row(s) from '{}'",
        payload.preview_data.len(),
        payload.rows,
        args.name
    );
    Ok(())
}

fn handle_summary(store: &DirStore, args: &cli::SummaryArgs) -> Result<()> {
    let config = IngestConfig {
        cascade: args.cascade.to_config(),
        ..IngestConfig::default()
    };
    let ingested = Ingestor::new(&config)
        .load(store, &args.name)
        .with_context(|| format!("Loading '{}'", args.name))?;
    let summary = schema::infer(&ingested.table);
    info!(
        "Summarized '{}': {} row(s), {} numeric and {} categorical column(s)",
        args.name,
        summary.row_count(),
        summary.numeric_columns().len(),
        summary.categorical_columns().len()
    );

    if args.facts {
        let facts = PromptFacts::collect(&ingested.table, summary);
        return match args.format {
            OutputFormat::Table => {
                println!("{}", facts.render());
                Ok(())
            }
            format => print_structured(&facts, format),
        };
    }
    match args.format {
        OutputFormat::Table => {
            let headers = ["column", "dtype", "missing", "mean", "min", "max"]
                .map(str::to_string)
                .to_vec();
            table::print_table(&headers, &summary.render_rows());
            Ok(())
        }
        format => print_structured(&summary, format),
    }
}

fn handle_delete(store: &DirStore, args: &cli::DeleteArgs) -> Result<()> {
    store
        .delete(&args.name)
        .with_context(|| format!("Deleting '{}'", args.name))?;
    info!("Deleted '{}'", args.name);
    Ok(())
}

#[derive(Debug, Serialize)]
struct InspectReport<'a> {
    file: &'a str,
    rows: usize,
    columns: usize,
    column_names: &'a [String],
    outcome: &'a ParseOutcome,
}

fn handle_inspect(args: &cli::InspectArgs) -> Result<()> {
    let config = IngestConfig {
        cascade: args.cascade.to_config(),
        ..IngestConfig::default()
    };
    let raw = read_local(&args.input)?;
    let ingested = Ingestor::new(&config)
        .ingest(&raw)
        .with_context(|| format!("Parsing {:?}", args.input))?;
    let outcome = &ingested.outcome;
    match args.format {
        OutputFormat::Table => {
            let headers = vec!["field".to_string(), "value".to_string()];
            table::print_table(&headers, &outcome_rows(&raw.name, &ingested));
            if !outcome.failures.is_empty() {
                println!();
                let headers = ["stage", "encoding", "delimiter", "error"]
                    .map(str::to_string)
                    .to_vec();
                let rows: Vec<Vec<String>> = outcome
                    .failures
                    .iter()
                    .map(|failure| {
                        vec![
                            failure.strategy.to_string(),
                            failure.encoding.unwrap_or_default().to_string(),
                            failure.delimiter.map(|d| d.to_string()).unwrap_or_default(),
                            failure.error.to_string(),
                        ]
                    })
                    .collect();
                table::print_table(&headers, &rows);
            }
        }
        format => print_structured(
            &InspectReport {
                file: &raw.name,
                rows: ingested.table.row_count(),
                columns: ingested.table.column_count(),
                column_names: ingested.table.columns(),
                outcome,
            },
            format,
        )?,
    }
    info!(
        "Inspected {:?} via {} stage after {} failed attempt(s)",
        args.input,
        outcome.strategy,
        outcome.failures.len()
    );
    Ok(())
}

fn outcome_rows(name: &str, ingested: &Ingested) -> Vec<Vec<String>> {
    let outcome = &ingested.outcome;
    let detected_encoding = outcome
        .detected_encoding
        .map(|guess| format!("{} ({:.2})", guess.name(), guess.confidence))
        .unwrap_or_default();
    [
        ("file", name.to_string()),
        ("strategy", outcome.strategy.to_string()),
        ("encoding", outcome.encoding.unwrap_or_default().to_string()),
        (
            "delimiter",
            outcome.delimiter.map(|d| d.to_string()).unwrap_or_default(),
        ),
        (
            "quote",
            outcome.quote.map(|q| q.to_string()).unwrap_or_default(),
        ),
        ("detected_encoding", detected_encoding),
        (
            "detected_delimiter",
            outcome
                .detected_delimiter
                .map(|d| d.to_string())
                .unwrap_or_default(),
        ),
        ("padded_rows", outcome.padded_rows.to_string()),
        ("truncated_rows", outcome.truncated_rows.to_string()),
        ("rows", ingested.table.row_count().to_string()),
        ("columns", ingested.table.column_count().to_string()),
    ]
    .into_iter()
    .map(|(field, value)| vec![field.to_string(), value])
    .collect()
}

fn read_local(path: &Path) -> Result<RawFile> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if !path.is_file() {
        return Err(IngestError::NotFound {
            file: path.display().to_string(),
        }
        .into());
    }
    let bytes = fs::read(path).with_context(|| format!("Reading {path:?}"))?;
    debug!("Read {} byte(s) from {:?}", bytes.len(), path);
    Ok(RawFile::new(name, bytes))
}

fn print_structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(value).context("Serializing output to YAML")?;
            print!("{yaml}");
        }
        OutputFormat::Json | OutputFormat::Table => {
            let json = serde_json::to_string_pretty(value).context("Serializing output to JSON")?;
            println!("{json}");
        }
    }
    Ok(())
}
