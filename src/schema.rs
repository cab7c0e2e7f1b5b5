//! Column classification and descriptive statistics for parsed tables.
//!
//! Classification order per column:
//!
//! - no present value at all: [`ColumnKind::Other`]
//! - every present value parses as a finite number: [`ColumnKind::Numeric`]
//! - anything else: [`ColumnKind::Categorical`]
//!
//! Date-like strings are categorical; no temporal typing is attempted.

use std::fmt;

use itertools::Itertools;
use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::{
    data::parse_number,
    stats::{ColumnStats, NumericStats, format_number},
    table::Table,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Categorical,
    Other,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Categorical => "categorical",
            ColumnKind::Other => "other",
        };
        f.write_str(label)
    }
}

/// Immutable description of a [`Table`].
///
/// Column-keyed fields keep column order and serialize as maps; duplicate
/// column names produce duplicate keys rather than being merged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSummary {
    row_count: usize,
    column_count: usize,
    column_names: Vec<String>,
    #[serde(serialize_with = "ordered_map")]
    dtypes: Vec<(String, ColumnKind)>,
    #[serde(serialize_with = "ordered_map")]
    missing_value_counts: Vec<(String, usize)>,
    numeric_columns: Vec<String>,
    categorical_columns: Vec<String>,
    #[serde(serialize_with = "ordered_map")]
    numeric_stats: Vec<(String, NumericStats)>,
}

impl TableSummary {
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric_columns
    }

    pub fn categorical_columns(&self) -> &[String] {
        &self.categorical_columns
    }

    pub fn dtypes(&self) -> impl Iterator<Item = (&str, ColumnKind)> + '_ {
        self.dtypes.iter().map(|(name, kind)| (name.as_str(), *kind))
    }

    pub fn dtype(&self, column: &str) -> Option<ColumnKind> {
        lookup(&self.dtypes, column).copied()
    }

    pub fn missing_count(&self, column: &str) -> Option<usize> {
        lookup(&self.missing_value_counts, column).copied()
    }

    pub fn numeric_stats(&self, column: &str) -> Option<NumericStats> {
        lookup(&self.numeric_stats, column).copied()
    }

    /// One line per column: name, kind, missing count, then mean/min/max when numeric.
    pub fn render_rows(&self) -> Vec<Vec<String>> {
        self.dtypes
            .iter()
            .zip(&self.missing_value_counts)
            .enumerate()
            .map(|(idx, ((name, kind), (_, missing)))| {
                let stats = (*kind == ColumnKind::Numeric)
                    .then(|| self.stats_at(idx, name))
                    .flatten();
                let metric = |pick: fn(&NumericStats) -> f64| {
                    stats.as_ref().map(|s| format_number(pick(s))).unwrap_or_default()
                };
                vec![
                    name.clone(),
                    kind.to_string(),
                    missing.to_string(),
                    metric(|s| s.mean),
                    metric(|s| s.min),
                    metric(|s| s.max),
                ]
            })
            .collect()
    }

    /// Stats for the numeric column at position `idx`, even when its name repeats.
    fn stats_at(&self, idx: usize, name: &str) -> Option<NumericStats> {
        let occurrence = self.dtypes[..idx]
            .iter()
            .filter(|(other, kind)| other == name && *kind == ColumnKind::Numeric)
            .count();
        self.numeric_stats
            .iter()
            .filter(|(other, _)| other == name)
            .nth(occurrence)
            .map(|(_, stats)| *stats)
    }
}

pub fn infer(table: &Table) -> TableSummary {
    let mut dtypes = Vec::with_capacity(table.column_count());
    let mut missing_value_counts = Vec::with_capacity(table.column_count());
    let mut numeric_columns = Vec::new();
    let mut categorical_columns = Vec::new();
    let mut numeric_stats = Vec::new();

    for (idx, name) in table.columns().iter().enumerate() {
        let mut missing = 0usize;
        let mut present = 0usize;
        let mut numeric = true;
        let mut stats = ColumnStats::new();
        for cell in table.column(idx) {
            match cell {
                None => missing += 1,
                Some(value) => {
                    present += 1;
                    if numeric {
                        match parse_number(value) {
                            Some(number) => stats.add_value(number),
                            None => numeric = false,
                        }
                    }
                }
            }
        }

        let kind = if present == 0 {
            ColumnKind::Other
        } else if numeric {
            ColumnKind::Numeric
        } else {
            ColumnKind::Categorical
        };
        match kind {
            ColumnKind::Numeric => {
                numeric_columns.push(name.clone());
                if let Some(summary) = stats.finish() {
                    numeric_stats.push((name.clone(), summary));
                }
            }
            ColumnKind::Categorical => categorical_columns.push(name.clone()),
            ColumnKind::Other => {}
        }
        dtypes.push((name.clone(), kind));
        missing_value_counts.push((name.clone(), missing));
    }

    TableSummary {
        row_count: table.row_count(),
        column_count: table.column_count(),
        column_names: table.columns().to_vec(),
        dtypes,
        missing_value_counts,
        numeric_columns,
        categorical_columns,
        numeric_stats,
    }
}

/// Up to `limit` distinct present values of a column, in first-seen order.
pub fn sample_values(table: &Table, column: usize, limit: usize) -> Vec<String> {
    table
        .column(column)
        .flatten()
        .unique()
        .take(limit)
        .map(str::to_string)
        .collect()
}

fn lookup<'a, T>(entries: &'a [(String, T)], column: &str) -> Option<&'a T> {
    entries
        .iter()
        .find(|(name, _)| name == column)
        .map(|(_, value)| value)
}

#[allow(clippy::ptr_arg)]
fn ordered_map<S, T>(entries: &Vec<(String, T)>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize,
{
    let mut map = serializer.serialize_map(Some(entries.len()))?;
    for (key, value) in entries {
        map.serialize_entry(key, value)?;
    }
    map.end()
}
