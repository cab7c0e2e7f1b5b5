//! Error types crossing the ingestion boundary.
//!
//! [`StructuralError`] is local to one cascade stage and only ever travels
//! inside [`StageFailure`] diagnostics. [`IngestError`] is what callers see.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::{cascade::StageFailure, delimiter::Delimiter};

/// A cascade stage could not shape the input into a rectangular table.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StructuralError {
    #[error("no records found")]
    NoRecords,
    #[error("bytes are not valid {encoding}")]
    Decode { encoding: &'static str },
    #[error("line {line} has {found} field(s), expected {expected}")]
    RaggedRow {
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("single column parsed with '{chosen}' but header contains '{present}'")]
    DelimiterMismatch {
        chosen: Delimiter,
        present: Delimiter,
    },
    #[error("no consistent dialect in sample")]
    NoDialect,
    #[error("csv error: {message}")]
    Csv { message: String },
}

impl StructuralError {
    pub(crate) fn from_csv(err: &csv::Error) -> Self {
        match err.kind() {
            csv::ErrorKind::UnequalLengths {
                pos,
                expected_len,
                len,
            } => StructuralError::RaggedRow {
                line: pos.as_ref().map(|p| p.line()).unwrap_or_default(),
                expected: *expected_len as usize,
                found: *len as usize,
            },
            _ => StructuralError::Csv {
                message: err.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatIssue {
    #[error("extension '{0}' is not one of .csv, .xlsx, .xls")]
    Extension(String),
    #[error("missing capability: {0}")]
    MissingCapability(String),
}

/// How a caller should present an [`IngestError`] to its user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    InvalidInput,
    Configuration,
    NotFound,
    Internal,
}

impl ErrorClass {
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorClass::Internal => 1,
            ErrorClass::InvalidInput => 2,
            ErrorClass::NotFound => 3,
            ErrorClass::Configuration => 4,
        }
    }
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("file '{file}' is empty")]
    EmptyFile { file: String },
    #[error("file '{file}' has an unsupported format: {issue}")]
    UnsupportedFormat { file: String, issue: FormatIssue },
    #[error("could not parse '{file}' after {} attempt(s)", .attempts.len())]
    UnrecoverableParse {
        file: String,
        attempts: Vec<StageFailure>,
    },
    #[error("file '{file}' not found")]
    NotFound { file: String },
    #[error("failed to read spreadsheet '{file}': {message}")]
    Spreadsheet { file: String, message: String },
    #[error("storage I/O failed for {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl IngestError {
    pub fn class(&self) -> ErrorClass {
        match self {
            IngestError::EmptyFile { .. } | IngestError::Spreadsheet { .. } => {
                ErrorClass::InvalidInput
            }
            IngestError::UnsupportedFormat { issue, .. } => match issue {
                FormatIssue::Extension(_) => ErrorClass::InvalidInput,
                FormatIssue::MissingCapability(_) => ErrorClass::Configuration,
            },
            IngestError::NotFound { .. } => ErrorClass::NotFound,
            IngestError::UnrecoverableParse { .. } | IngestError::Io { .. } => {
                ErrorClass::Internal
            }
        }
    }
}
