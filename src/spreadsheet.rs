//! Binary spreadsheet input (.xlsx / .xls).
//!
//! Only the first worksheet is read. Its first row supplies the header, and
//! every later row becomes a data row of the same width.

use thiserror::Error;

use crate::table::Table;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpreadsheetError {
    #[error("spreadsheet support is not available: {0}")]
    MissingCapability(String),
    #[error("workbook has no data")]
    Empty,
    #[error("{0}")]
    Read(String),
}

pub trait SpreadsheetReader: Send + Sync {
    fn read_table(&self, bytes: &[u8]) -> Result<Table, SpreadsheetError>;
}

/// Reader used when the crate is built without the `spreadsheet` feature.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableReader;

impl SpreadsheetReader for UnavailableReader {
    fn read_table(&self, _bytes: &[u8]) -> Result<Table, SpreadsheetError> {
        Err(SpreadsheetError::MissingCapability(
            "rebuild with the `spreadsheet` feature to read .xlsx/.xls files".to_string(),
        ))
    }
}

#[cfg(feature = "spreadsheet")]
pub fn default_reader() -> Box<dyn SpreadsheetReader> {
    Box::new(CalamineReader)
}

#[cfg(not(feature = "spreadsheet"))]
pub fn default_reader() -> Box<dyn SpreadsheetReader> {
    Box::new(UnavailableReader)
}

#[cfg(feature = "spreadsheet")]
pub use calamine_reader::CalamineReader;

#[cfg(feature = "spreadsheet")]
mod calamine_reader {
    use std::io::Cursor;

    use calamine::{Data, DataType, Reader, open_workbook_auto_from_rs};
    use log::debug;

    use super::{SpreadsheetError, SpreadsheetReader};
    use crate::{
        data::{cell_from_raw, header_names},
        table::{Cell, Table},
    };

    const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    #[derive(Debug, Clone, Copy, Default)]
    pub struct CalamineReader;

    impl SpreadsheetReader for CalamineReader {
        fn read_table(&self, bytes: &[u8]) -> Result<Table, SpreadsheetError> {
            let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
                .map_err(|err| SpreadsheetError::Read(err.to_string()))?;
            let range = workbook
                .worksheet_range_at(0)
                .ok_or(SpreadsheetError::Empty)?
                .map_err(|err| SpreadsheetError::Read(err.to_string()))?;

            let mut rows = range.rows();
            let header = rows.next().ok_or(SpreadsheetError::Empty)?;
            let header_text: Vec<String> = header
                .iter()
                .map(|cell| cell_text(cell).unwrap_or_default())
                .collect();
            let columns = header_names(header_text.iter().map(String::as_str));
            let body: Vec<Vec<Cell>> = rows
                .map(|row| {
                    row.iter()
                        .map(|cell| cell_text(cell).and_then(|text| cell_from_raw(&text)))
                        .collect()
                })
                .collect();
            debug!(
                "Read worksheet with {} column(s) and {} row(s)",
                columns.len(),
                body.len()
            );
            Table::new(columns, body).map_err(|err| SpreadsheetError::Read(err.to_string()))
        }
    }

    fn cell_text(cell: &Data) -> Option<String> {
        if cell.is_empty() {
            return None;
        }
        if cell.is_datetime()
            && let Some(datetime) = cell.as_datetime()
        {
            return Some(datetime.format(DATETIME_FORMAT).to_string());
        }
        match cell {
            Data::String(text) | Data::DateTimeIso(text) | Data::DurationIso(text) => {
                Some(text.clone())
            }
            Data::Error(_) => None,
            other => Some(other.to_string()),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn garbage_bytes_are_a_read_error() {
            let err = CalamineReader.read_table(b"not a workbook").unwrap_err();
            assert!(matches!(err, SpreadsheetError::Read(_)));
        }

        #[test]
        fn cells_render_as_display_text() {
            assert_eq!(cell_text(&Data::Empty), None);
            assert_eq!(cell_text(&Data::Float(30.0)), Some("30".to_string()));
            assert_eq!(cell_text(&Data::Int(7)), Some("7".to_string()));
            assert_eq!(cell_text(&Data::String("Ana".into())), Some("Ana".to_string()));
            assert_eq!(cell_text(&Data::Bool(true)), Some("true".to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_reader_reports_missing_capability() {
        let err = UnavailableReader.read_table(b"PK").unwrap_err();
        assert!(matches!(err, SpreadsheetError::MissingCapability(_)));
    }
}
