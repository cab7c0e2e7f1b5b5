use std::borrow::Cow;
use std::fmt::Write as _;

use serde::Serialize;

use crate::error::StructuralError;

/// A decoded cell; `None` marks a missing value.
pub type Cell = Option<String>;

/// Rectangular table of string cells. Every row has one cell per column.
///
/// Column names need not be unique; name lookups resolve to the first match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self, StructuralError> {
        let width = columns.len();
        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != width) {
            return Err(StructuralError::RaggedRow {
                line: idx as u64 + 2,
                expected: width,
                found: row.len(),
            });
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column(&self, index: usize) -> impl Iterator<Item = Option<&str>> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(index).and_then(|cell| cell.as_deref()))
    }

    /// Pairs each column name with the cell at `row`.
    pub fn record(&self, row: usize) -> Option<impl Iterator<Item = (&str, Option<&str>)> + '_> {
        let cells = self.rows.get(row)?;
        Some(
            self.columns
                .iter()
                .zip(cells)
                .map(|(name, cell)| (name.as_str(), cell.as_deref())),
        )
    }
}

/// Renders rows as aligned plain text with a dashed rule under the header.
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| display_width(h).max(1)).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(display_width(cell));
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers, &widths));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat((*w).max(3))).collect();
    let rule_widths: Vec<usize> = widths.iter().map(|w| (*w).max(3)).collect();
    let _ = writeln!(output, "{}", format_row(&rule, &rule_widths));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    output
}

pub fn print_table(headers: &[String], rows: &[Vec<String>]) {
    print!("{}", render_table(headers, rows));
}

fn format_row(values: &[String], widths: &[usize]) -> String {
    let line = values
        .iter()
        .zip(widths)
        .map(|(value, width)| {
            let cell = flatten_whitespace(value);
            let padding = width.saturating_sub(display_width(&cell));
            format!("{cell}{}", " ".repeat(padding))
        })
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}

fn display_width(value: &str) -> usize {
    value.chars().count()
}

fn flatten_whitespace(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[Option<&str>]) -> Vec<Cell> {
        values.iter().map(|v| v.map(str::to_string)).collect()
    }

    #[test]
    fn new_rejects_rows_with_wrong_arity() {
        let err = Table::new(
            vec!["a".to_string(), "b".to_string()],
            vec![cells(&[Some("1"), Some("2")]), cells(&[Some("3")])],
        )
        .unwrap_err();
        assert_eq!(
            err,
            StructuralError::RaggedRow {
                line: 3,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn column_and_record_views_follow_row_order() {
        let table = Table::new(
            vec!["name".to_string(), "age".to_string()],
            vec![cells(&[Some("Ana"), Some("30")]), cells(&[Some("Luis"), None])],
        )
        .expect("table");
        let ages: Vec<_> = table.column(1).collect();
        assert_eq!(ages, vec![Some("30"), None]);
        let record: Vec<_> = table.record(1).expect("row").collect();
        assert_eq!(record, vec![("name", Some("Luis")), ("age", None)]);
        assert!(table.record(2).is_none());
        assert_eq!(table.column_index("age"), Some(1));
    }

    #[test]
    fn render_table_flattens_control_characters() {
        let rendered = render_table(
            &["note".to_string()],
            &[vec!["line1\nline2\tvalue".to_string()]],
        );
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "note");
        assert_eq!(lines[1], "-".repeat(17));
        assert_eq!(lines[2], "line1 line2 value");
    }
}
