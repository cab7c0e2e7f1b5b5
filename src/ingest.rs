//! Routing from an uploaded file to a parsed table.
//!
//! `.csv` goes through the [`TableParser`] cascade; `.xlsx` and `.xls` go
//! straight to a [`SpreadsheetReader`] without any encoding or delimiter
//! detection. Any other extension is rejected before parsing starts.

use std::path::Path;

use log::info;

use crate::{
    cascade::{ParseOutcome, TableParser},
    config::IngestConfig,
    error::{FormatIssue, IngestError},
    spreadsheet::{self, SpreadsheetError, SpreadsheetReader},
    storage::FileStore,
    table::Table,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Xlsx,
    Xls,
}

impl FileFormat {
    /// Format from the extension of `name`, compared case-insensitively.
    pub fn from_name(name: &str) -> Result<Self, FormatIssue> {
        let extension = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        match extension.to_ascii_lowercase().as_str() {
            "csv" => Ok(FileFormat::Csv),
            "xlsx" => Ok(FileFormat::Xlsx),
            "xls" => Ok(FileFormat::Xls),
            _ => Err(FormatIssue::Extension(extension.to_string())),
        }
    }

    pub fn is_spreadsheet(self) -> bool {
        matches!(self, FileFormat::Xlsx | FileFormat::Xls)
    }
}

/// Uploaded bytes plus the name they arrived with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl RawFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ingested {
    pub table: Table,
    pub outcome: ParseOutcome,
}

pub struct Ingestor {
    parser: TableParser,
    spreadsheets: Box<dyn SpreadsheetReader>,
}

impl Ingestor {
    pub fn new(config: &IngestConfig) -> Self {
        Self {
            parser: TableParser::new(config.cascade),
            spreadsheets: spreadsheet::default_reader(),
        }
    }

    pub fn with_spreadsheet_reader(mut self, reader: Box<dyn SpreadsheetReader>) -> Self {
        self.spreadsheets = reader;
        self
    }

    pub fn ingest(&self, file: &RawFile) -> Result<Ingested, IngestError> {
        let format =
            FileFormat::from_name(&file.name).map_err(|issue| IngestError::UnsupportedFormat {
                file: file.name.clone(),
                issue,
            })?;
        if format.is_spreadsheet() {
            return self.ingest_spreadsheet(file);
        }
        let parsed = self.parser.parse(&file.bytes, &file.name)?;
        Ok(Ingested {
            table: parsed.table,
            outcome: parsed.outcome,
        })
    }

    /// Reads `name` from `store` and ingests it.
    pub fn load(&self, store: &dyn FileStore, name: &str) -> Result<Ingested, IngestError> {
        if !store.exists(name) {
            return Err(IngestError::NotFound {
                file: name.to_string(),
            });
        }
        let bytes = store.read(name)?;
        self.ingest(&RawFile::new(name, bytes))
    }

    fn ingest_spreadsheet(&self, file: &RawFile) -> Result<Ingested, IngestError> {
        let table = self
            .spreadsheets
            .read_table(&file.bytes)
            .map_err(|err| match err {
                SpreadsheetError::MissingCapability(detail) => IngestError::UnsupportedFormat {
                    file: file.name.clone(),
                    issue: FormatIssue::MissingCapability(detail),
                },
                SpreadsheetError::Empty => IngestError::EmptyFile {
                    file: file.name.clone(),
                },
                SpreadsheetError::Read(message) => IngestError::Spreadsheet {
                    file: file.name.clone(),
                    message,
                },
            })?;
        info!(
            "Read spreadsheet '{}' ({} row(s), {} column(s))",
            file.name,
            table.row_count(),
            table.column_count()
        );
        Ok(Ingested {
            table,
            outcome: ParseOutcome::spreadsheet(),
        })
    }
}

impl Default for Ingestor {
    fn default() -> Self {
        Self::new(&IngestConfig::default())
    }
}
