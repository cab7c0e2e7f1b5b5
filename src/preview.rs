use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::{data::parse_timestamp, table::Table};

pub const DEFAULT_PREVIEW_ROWS: usize = 5;

const ISO_TIMESTAMP: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// One previewed row: column name to display value, in column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRow {
    cells: Vec<(String, Option<String>)>,
}

impl PreviewRow {
    pub fn get(&self, column: &str) -> Option<Option<&str>> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_deref())
    }

    pub fn cells(&self) -> impl Iterator<Item = (&str, Option<&str>)> + '_ {
        self.cells
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_deref()))
    }

    pub fn values(&self) -> impl Iterator<Item = Option<&str>> + '_ {
        self.cells.iter().map(|(_, value)| value.as_deref())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// First `limit` cells of the row.
    pub fn truncated(&self, limit: usize) -> PreviewRow {
        PreviewRow {
            cells: self.cells.iter().take(limit).cloned().collect(),
        }
    }
}

impl Serialize for PreviewRow {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (name, value) in &self.cells {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Display payload for a stored file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilePreview {
    pub filename: String,
    pub rows: usize,
    pub columns: usize,
    pub column_names: Vec<String>,
    pub preview_data: Vec<PreviewRow>,
}

impl FilePreview {
    pub fn new(filename: impl Into<String>, table: &Table, rows: usize) -> Self {
        Self {
            filename: filename.into(),
            rows: table.row_count(),
            columns: table.column_count(),
            column_names: table.columns().to_vec(),
            preview_data: preview(table, rows),
        }
    }

    /// Preview cells as plain strings, missing values blank.
    pub fn render_rows(&self) -> Vec<Vec<String>> {
        self.preview_data
            .iter()
            .map(|row| {
                row.values()
                    .map(|value| value.unwrap_or_default().to_string())
                    .collect()
            })
            .collect()
    }
}

/// The first `rows` rows with cells coerced to display strings.
pub fn preview(table: &Table, rows: usize) -> Vec<PreviewRow> {
    (0..rows.min(table.row_count()))
        .filter_map(|idx| table.record(idx))
        .map(|record| PreviewRow {
            cells: record
                .map(|(name, cell)| (name.to_string(), cell.map(display_value)))
                .collect(),
        })
        .collect()
}

fn display_value(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(timestamp) => timestamp.format(ISO_TIMESTAMP).to_string(),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(
            vec!["when".to_string(), "qty".to_string()],
            vec![
                vec![Some("2024-05-06 14:30".to_string()), Some("3".to_string())],
                vec![None, Some("4.50".to_string())],
            ],
        )
        .expect("table")
    }

    #[test]
    fn short_tables_preview_every_row() {
        let rows = preview(&sample(), DEFAULT_PREVIEW_ROWS);
        assert_eq!(rows.len(), 2);
        assert!(preview(&sample(), 0).is_empty());
    }

    #[test]
    fn cells_are_coerced_for_display() {
        let rows = preview(&sample(), 5);
        assert_eq!(rows[0].get("when"), Some(Some("2024-05-06T14:30:00")));
        assert_eq!(rows[1].get("when"), Some(None));
        assert_eq!(rows[1].get("qty"), Some(Some("4.50")));
        assert_eq!(rows[0].get("missing"), None);
    }

    #[test]
    fn preview_rows_serialize_as_ordered_objects() {
        let json = serde_json::to_string(&preview(&sample(), 5)).expect("json");
        assert_eq!(
            json,
            r#"[{"when":"2024-05-06T14:30:00","qty":"3"},{"when":null,"qty":"4.50"}]"#
        );
    }

    #[test]
    fn file_preview_reports_full_shape() {
        let payload = FilePreview::new("abc_sales.csv", &sample(), 1);
        assert_eq!(payload.rows, 2);
        assert_eq!(payload.columns, 2);
        assert_eq!(payload.preview_data.len(), 1);
        assert_eq!(payload.render_rows(), vec![vec!["2024-05-06T14:30:00", "3"]]);
    }
}
