//! The delimited-text parsing cascade.
//!
//! Attempts run in a fixed order and stop at the first success:
//!
//! 1. **Detected**: detected encoding + detected delimiter, strict arity.
//! 2. **Brute force**: every grid encoding (outer) x candidate delimiter
//!    (inner), strict arity.
//! 3. **Sniffed**: lossy UTF-8, dialect inferred from a bounded sample; short
//!    rows are padded with missing cells, long rows fail the stage.
//! 4. **Manual**: lossy UTF-8, non-empty trimmed lines split on the dominant
//!    delimiter of the first line; short rows are padded, long rows truncated.
//!
//! Every failed attempt is kept as a [`StageFailure`] so callers can see why
//! the winning stage was reached.

use std::fmt;

use encoding_rs::{Encoding, UTF_8};
use log::{debug, info, warn};
use serde::Serialize;

use crate::{
    config::CascadeConfig,
    data::{cell_from_raw, header_names},
    delimiter::{self, CANDIDATES, Delimiter},
    encoding::{EncodingDetector, EncodingGuess},
    error::{IngestError, StructuralError},
    io_utils,
    sniff::{self, Dialect},
    table::{Cell, Table},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Detected,
    BruteForce,
    Sniffed,
    Manual,
    Spreadsheet,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Strategy::Detected => "detected",
            Strategy::BruteForce => "brute-force",
            Strategy::Sniffed => "sniffed",
            Strategy::Manual => "manual",
            Strategy::Spreadsheet => "spreadsheet",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageFailure {
    pub strategy: Strategy,
    pub encoding: Option<&'static str>,
    pub delimiter: Option<Delimiter>,
    pub error: StructuralError,
}

/// How a table was obtained.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseOutcome {
    pub strategy: Strategy,
    pub encoding: Option<&'static str>,
    pub delimiter: Option<Delimiter>,
    pub quote: Option<char>,
    pub detected_encoding: Option<EncodingGuess>,
    pub detected_delimiter: Option<Delimiter>,
    pub padded_rows: usize,
    pub truncated_rows: usize,
    pub failures: Vec<StageFailure>,
}

impl ParseOutcome {
    pub fn spreadsheet() -> Self {
        Self {
            strategy: Strategy::Spreadsheet,
            encoding: None,
            delimiter: None,
            quote: None,
            detected_encoding: None,
            detected_delimiter: None,
            padded_rows: 0,
            truncated_rows: 0,
            failures: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTable {
    pub table: Table,
    pub outcome: ParseOutcome,
}

#[derive(Debug, Clone, Copy)]
enum Attempt {
    Strict {
        strategy: Strategy,
        label: &'static str,
        encoding: &'static Encoding,
        delimiter: Delimiter,
    },
    Sniff,
    Manual,
}

impl Attempt {
    fn strategy(&self) -> Strategy {
        match self {
            Attempt::Strict { strategy, .. } => *strategy,
            Attempt::Sniff => Strategy::Sniffed,
            Attempt::Manual => Strategy::Manual,
        }
    }

    fn encoding_label(&self) -> &'static str {
        match self {
            Attempt::Strict { label, .. } => *label,
            Attempt::Sniff | Attempt::Manual => UTF_8.name(),
        }
    }
}

/// Result of one successful attempt before it is stamped with diagnostics.
struct Shaped {
    table: Table,
    delimiter: Delimiter,
    quote: Option<u8>,
    padded_rows: usize,
    truncated_rows: usize,
}

impl Shaped {
    fn exact(table: Table, delimiter: Delimiter) -> Self {
        Self {
            table,
            delimiter,
            quote: Some(b'"'),
            padded_rows: 0,
            truncated_rows: 0,
        }
    }
}

/// Remembers the last strict decode; grid attempts share an encoding in runs.
#[derive(Default)]
struct DecodeCache {
    entry: Option<(&'static Encoding, Result<String, StructuralError>)>,
}

impl DecodeCache {
    fn get(&mut self, bytes: &[u8], encoding: &'static Encoding) -> Result<&str, StructuralError> {
        let stale = self.entry.as_ref().is_none_or(|(cached, _)| *cached != encoding);
        if stale {
            self.entry = Some((encoding, io_utils::decode_strict(bytes, encoding)));
        }
        match &self.entry {
            Some((_, Ok(text))) => Ok(text.as_str()),
            Some((_, Err(err))) => Err(err.clone()),
            None => Err(StructuralError::NoRecords),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TableParser {
    config: CascadeConfig,
    detector: EncodingDetector,
}

impl TableParser {
    pub fn new(config: CascadeConfig) -> Self {
        Self {
            config,
            detector: EncodingDetector::new(config.encoding_probe_bytes),
        }
    }

    pub fn config(&self) -> &CascadeConfig {
        &self.config
    }

    /// Parses delimited bytes, escalating through the cascade.
    ///
    /// `file` only labels errors and log lines.
    pub fn parse(&self, bytes: &[u8], file: &str) -> Result<ParsedTable, IngestError> {
        let guess = self.detector.detect(bytes);
        let preview_text = io_utils::decode_lossy(bytes, guess.encoding);
        let sample = delimiter::sample_lines(&preview_text, self.config.delimiter_sample_lines);
        let detected = delimiter::detect(sample, &CANDIDATES);
        debug!(
            "Detected encoding {} (confidence {:.2}) and delimiter '{}' for '{}'",
            guess.name(),
            guess.confidence,
            detected,
            file
        );

        let mut cache = DecodeCache::default();
        let mut failures = Vec::new();
        for attempt in self.attempts(guess.encoding, detected) {
            match self.run(attempt, bytes, &mut cache) {
                Ok(shaped) => {
                    info!(
                        "Parsed '{}' via {} stage ({} row(s), {} column(s), encoding {}, delimiter '{}')",
                        file,
                        attempt.strategy(),
                        shaped.table.row_count(),
                        shaped.table.column_count(),
                        attempt.encoding_label(),
                        shaped.delimiter
                    );
                    let outcome = ParseOutcome {
                        strategy: attempt.strategy(),
                        encoding: Some(attempt.encoding_label()),
                        delimiter: Some(shaped.delimiter),
                        quote: shaped.quote.map(char::from),
                        detected_encoding: Some(guess),
                        detected_delimiter: Some(detected),
                        padded_rows: shaped.padded_rows,
                        truncated_rows: shaped.truncated_rows,
                        failures,
                    };
                    return Ok(ParsedTable {
                        table: shaped.table,
                        outcome,
                    });
                }
                Err(error) => {
                    let delimiter = match attempt {
                        Attempt::Strict { delimiter, .. } => Some(delimiter),
                        Attempt::Sniff | Attempt::Manual => None,
                    };
                    debug!(
                        "Stage {} failed for '{}' (encoding {}, delimiter {}): {}",
                        attempt.strategy(),
                        file,
                        attempt.encoding_label(),
                        delimiter.map_or_else(|| "auto".to_string(), |d| format!("'{d}'")),
                        error
                    );
                    failures.push(StageFailure {
                        strategy: attempt.strategy(),
                        encoding: Some(attempt.encoding_label()),
                        delimiter,
                        error,
                    });
                }
            }
        }

        if failures
            .iter()
            .all(|f| f.error == StructuralError::NoRecords)
        {
            Err(IngestError::EmptyFile {
                file: file.to_string(),
            })
        } else {
            Err(IngestError::UnrecoverableParse {
                file: file.to_string(),
                attempts: failures,
            })
        }
    }

    fn attempts(
        &self,
        detected_encoding: &'static Encoding,
        detected_delimiter: Delimiter,
    ) -> impl Iterator<Item = Attempt> + use<> {
        let primary = Attempt::Strict {
            strategy: Strategy::Detected,
            label: detected_encoding.name(),
            encoding: detected_encoding,
            delimiter: detected_delimiter,
        };
        let grid = io_utils::grid_encodings()
            .into_iter()
            .flat_map(|(label, encoding)| {
                CANDIDATES.into_iter().map(move |delimiter| Attempt::Strict {
                    strategy: Strategy::BruteForce,
                    label,
                    encoding,
                    delimiter,
                })
            });
        std::iter::once(primary)
            .chain(grid)
            .chain(std::iter::once(Attempt::Sniff))
            .chain(self.config.manual_fallback.then_some(Attempt::Manual))
    }

    fn run(
        &self,
        attempt: Attempt,
        bytes: &[u8],
        cache: &mut DecodeCache,
    ) -> Result<Shaped, StructuralError> {
        match attempt {
            Attempt::Strict {
                encoding,
                delimiter,
                ..
            } => parse_strict(cache.get(bytes, encoding)?, delimiter),
            Attempt::Sniff => {
                let text = io_utils::decode_lossy(bytes, UTF_8);
                if text.trim().is_empty() {
                    return Err(StructuralError::NoRecords);
                }
                let sample = io_utils::sample_prefix(&text, self.config.sniff_sample_bytes);
                let dialect = sniff::sniff(sample, self.config.sniff_consistency)
                    .ok_or(StructuralError::NoDialect)?;
                parse_sniffed(&text, dialect)
            }
            Attempt::Manual => parse_manual(&io_utils::decode_lossy(bytes, UTF_8)),
        }
    }
}

/// Header plus rows with exact arity; any ragged row fails the attempt.
///
/// Whitespace-only lines are skipped rather than read as one-field rows.
fn parse_strict(text: &str, delimiter: Delimiter) -> Result<Shaped, StructuralError> {
    if text.trim().is_empty() {
        return Err(StructuralError::NoRecords);
    }
    let mut reader = io_utils::open_csv_reader(
        text.as_bytes(),
        delimiter.as_byte(),
        true,
        true,
        Some(b'"'),
    );
    let headers = reader
        .headers()
        .map_err(|err| StructuralError::from_csv(&err))?
        .clone();
    if headers.is_empty() {
        return Err(StructuralError::NoRecords);
    }
    if headers.len() == 1 {
        let header = headers.get(0).unwrap_or_default();
        if let Some(present) = CANDIDATES
            .into_iter()
            .find(|&c| c != delimiter && header.contains(c.as_char()))
        {
            return Err(StructuralError::DelimiterMismatch {
                chosen: delimiter,
                present,
            });
        }
    }

    let width = headers.len();
    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|err| StructuralError::from_csv(&err))?;
        if io_utils::is_blank_record(&record) {
            continue;
        }
        if record.len() != width {
            return Err(StructuralError::RaggedRow {
                line: line_of(&record, idx),
                expected: width,
                found: record.len(),
            });
        }
        rows.push(record.iter().map(cell_from_raw).collect::<Vec<Cell>>());
    }

    let blank_header = headers.iter().all(|h| h.trim().is_empty());
    if blank_header && rows.iter().flatten().all(Option::is_none) {
        return Err(StructuralError::NoRecords);
    }
    let table = Table::new(header_names(headers.iter()), rows)?;
    Ok(Shaped::exact(table, delimiter))
}

fn parse_sniffed(text: &str, dialect: Dialect) -> Result<Shaped, StructuralError> {
    let mut reader = io_utils::open_csv_reader(
        text.as_bytes(),
        dialect.delimiter.as_byte(),
        false,
        true,
        dialect.quote,
    );
    let mut records = reader.records();
    let header = match records.next() {
        Some(record) => record.map_err(|err| StructuralError::from_csv(&err))?,
        None => return Err(StructuralError::NoRecords),
    };
    let trim = |value: &str| -> String {
        if dialect.skip_initial_space {
            value.trim_start().to_string()
        } else {
            value.to_string()
        }
    };
    let columns: Vec<String> = header.iter().map(trim).collect();
    let width = columns.len();

    let mut rows = Vec::new();
    let mut padded_rows = 0;
    for (idx, record) in records.enumerate() {
        let record = record.map_err(|err| StructuralError::from_csv(&err))?;
        if io_utils::is_blank_record(&record) {
            continue;
        }
        if record.len() > width {
            return Err(StructuralError::RaggedRow {
                line: line_of(&record, idx),
                expected: width,
                found: record.len(),
            });
        }
        let mut row: Vec<Cell> = record.iter().map(|v| cell_from_raw(&trim(v))).collect();
        if row.len() < width {
            padded_rows += 1;
            row.resize(width, None);
        }
        rows.push(row);
    }
    if padded_rows > 0 {
        warn!(
            "Sniffed dialect on '{}' padded {} row(s) to {} column(s)",
            dialect.delimiter, padded_rows, width
        );
    }

    let table = Table::new(header_names(columns.iter().map(String::as_str)), rows)?;
    Ok(Shaped {
        table,
        delimiter: dialect.delimiter,
        quote: dialect.quote,
        padded_rows,
        truncated_rows: 0,
    })
}

/// Source line of a data record; `idx` counts records after the header.
fn line_of(record: &csv::StringRecord, idx: usize) -> u64 {
    record.position().map_or(idx as u64 + 2, |p| p.line())
}

fn parse_manual(text: &str) -> Result<Shaped, StructuralError> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let Some((first, rest)) = lines.split_first() else {
        return Err(StructuralError::NoRecords);
    };

    let delimiter = delimiter::detect(first, &CANDIDATES);
    let separator = delimiter.as_char();
    let columns = header_names(first.split(separator));
    let width = columns.len();

    let mut rows = Vec::with_capacity(rest.len());
    let mut padded_rows = 0;
    let mut truncated_rows = 0;
    for line in rest {
        let mut row: Vec<Cell> = line.split(separator).map(cell_from_raw).collect();
        if row.len() < width {
            padded_rows += 1;
            row.resize(width, None);
        } else if row.len() > width {
            truncated_rows += 1;
            row.truncate(width);
        }
        rows.push(row);
    }
    if padded_rows > 0 || truncated_rows > 0 {
        warn!(
            "Manual split on '{}' padded {} and truncated {} row(s) to {} column(s)",
            delimiter, padded_rows, truncated_rows, width
        );
    }

    let table = Table::new(columns, rows)?;
    Ok(Shaped {
        table,
        delimiter,
        quote: None,
        padded_rows,
        truncated_rows,
    })
}
