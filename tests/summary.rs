mod common;

use common::{fixture_bytes, parse};
use tabular_digest::{ColumnKind, PromptFacts, schema};

#[test]
fn semicolon_people_summary() {
    let parsed = parse(&fixture_bytes("people_semicolon.csv"));
    let summary = schema::infer(&parsed.table);

    assert_eq!(summary.row_count(), 2);
    assert_eq!(summary.column_count(), 2);
    assert_eq!(summary.column_names(), ["name", "age"]);
    assert_eq!(summary.dtype("age"), Some(ColumnKind::Numeric));
    assert_eq!(summary.dtype("name"), Some(ColumnKind::Categorical));
    assert_eq!(summary.numeric_columns(), ["age"]);
    assert_eq!(summary.categorical_columns(), ["name"]);
    let age = summary.numeric_stats("age").expect("age stats");
    assert_eq!(age.mean, 27.5);
    assert_eq!(age.min, 25.0);
    assert_eq!(age.max, 30.0);
    assert!(summary.numeric_stats("name").is_none());
}

#[test]
fn complete_numeric_column_statistics() {
    let parsed = parse(b"id,value\na,10\nb,20\nc,30\n");
    let summary = schema::infer(&parsed.table);
    let stats = summary.numeric_stats("value").expect("stats");
    assert_eq!(stats.mean, 20.0);
    assert_eq!(stats.min, 10.0);
    assert_eq!(stats.max, 30.0);
    assert_eq!(summary.missing_count("value"), Some(0));
}

#[test]
fn statistics_ignore_missing_cells() {
    let parsed = parse(b"id,value\na,10\nb,\nc,30\n");
    let summary = schema::infer(&parsed.table);
    let stats = summary.numeric_stats("value").expect("stats");
    assert_eq!(stats.mean, 20.0);
    assert_eq!(summary.missing_count("value"), Some(1));
}

#[test]
fn ragged_manual_table_counts_padded_cell_as_missing() {
    let parsed = parse(&fixture_bytes("ragged.csv"));
    let summary = schema::infer(&parsed.table);
    assert_eq!(summary.missing_count("c"), Some(1));
    assert_eq!(summary.dtype("c"), Some(ColumnKind::Numeric));
    assert_eq!(summary.numeric_stats("c").map(|s| s.mean), Some(3.0));
}

#[test]
fn header_only_file_has_only_other_columns() {
    let parsed = parse(b"a,b\n");
    let summary = schema::infer(&parsed.table);
    assert_eq!(summary.row_count(), 0);
    assert_eq!(summary.dtype("a"), Some(ColumnKind::Other));
    assert!(summary.numeric_columns().is_empty());
    assert!(summary.categorical_columns().is_empty());
}

#[test]
fn mixed_column_is_categorical() {
    let parsed = parse(b"code\n1\n2\nX3\n");
    let summary = schema::infer(&parsed.table);
    assert_eq!(summary.dtype("code"), Some(ColumnKind::Categorical));
}

#[test]
fn summary_yaml_lists_columns_in_order() {
    let parsed = parse(&fixture_bytes("people_semicolon.csv"));
    let yaml = serde_yaml::to_string(&schema::infer(&parsed.table)).expect("yaml");
    let name_at = yaml.find("name: categorical").expect("name dtype");
    let age_at = yaml.find("age: numeric").expect("age dtype");
    assert!(name_at < age_at);
    assert!(yaml.contains("row_count: 2"));
}

#[test]
fn prompt_facts_sample_categorical_values() {
    let parsed = parse(b"city,country,temp\nLima,PE,18\nQuito,EC,14\nLima,PE,19\n");
    let summary = schema::infer(&parsed.table);
    let facts = PromptFacts::collect(&parsed.table, summary);
    let json = serde_json::to_value(&facts).expect("json");
    assert_eq!(json["categorical_samples"][0]["values"][1], "Quito");
    assert_eq!(json["example_rows"][1]["temp"], "14");
    assert_eq!(json["summary"]["numeric_columns"][0], "temp");
}
