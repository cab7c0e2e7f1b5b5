//! Structured facts handed to a prompt-building collaborator.

use itertools::Itertools;
use serde::Serialize;

use crate::{
    preview::{self, PreviewRow},
    schema::{self, ColumnKind, TableSummary},
    stats::format_number,
    table::Table,
};

pub const CATEGORICAL_COLUMNS: usize = 3;
pub const CATEGORICAL_SAMPLES: usize = 5;
pub const EXAMPLE_ROWS: usize = 2;
pub const EXAMPLE_CELLS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalSample {
    pub column: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptFacts {
    pub summary: TableSummary,
    pub categorical_samples: Vec<CategoricalSample>,
    pub example_rows: Vec<PreviewRow>,
}

impl PromptFacts {
    pub fn collect(table: &Table, summary: TableSummary) -> Self {
        // Positions, not names: duplicate headers each keep their own samples.
        let categorical_samples = summary
            .dtypes()
            .enumerate()
            .filter(|(_, (_, kind))| *kind == ColumnKind::Categorical)
            .take(CATEGORICAL_COLUMNS)
            .map(|(idx, (column, _))| CategoricalSample {
                column: column.to_string(),
                values: schema::sample_values(table, idx, CATEGORICAL_SAMPLES),
            })
            .collect();
        let example_rows = preview::preview(table, EXAMPLE_ROWS)
            .iter()
            .map(|row| row.truncated(EXAMPLE_CELLS))
            .collect();
        Self {
            summary,
            categorical_samples,
            example_rows,
        }
    }

    /// Plain-text block listing the facts, one per line.
    pub fn render(&self) -> String {
        let summary = &self.summary;
        let mut lines = vec![
            format!("Rows: {}", summary.row_count()),
            format!("Columns: {}", summary.column_count()),
            format!("Column names: {}", summary.column_names().join(", ")),
            format!("Numeric columns: {}", summary.numeric_columns().join(", ")),
            format!(
                "Categorical columns: {}",
                summary.categorical_columns().join(", ")
            ),
        ];
        for column in summary.numeric_columns() {
            if let Some(stats) = summary.numeric_stats(column) {
                lines.push(format!(
                    "Stats for {}: mean={:.2} (min={}, max={})",
                    column,
                    stats.mean,
                    format_number(stats.min),
                    format_number(stats.max)
                ));
            }
        }
        for sample in &self.categorical_samples {
            lines.push(format!(
                "Sample values for {}: {}",
                sample.column,
                sample.values.join(", ")
            ));
        }
        for (idx, row) in self.example_rows.iter().enumerate() {
            let cells = row
                .cells()
                .map(|(name, value)| format!("{name}={}", value.unwrap_or("null")))
                .join(", ");
            lines.push(format!("Example row {}: {}", idx + 1, cells));
        }
        lines.join("\n")
    }
}
