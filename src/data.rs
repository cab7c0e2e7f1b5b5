use chrono::NaiveDateTime;

use crate::table::Cell;

/// Tokens read as missing in addition to blank cells.
const MISSING_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Year-first layouts treated as timestamps; day/month-first input is ambiguous.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
];

pub fn is_missing_token(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || MISSING_TOKENS.contains(&trimmed)
}

pub fn cell_from_raw(raw: &str) -> Cell {
    if is_missing_token(raw) {
        None
    } else {
        Some(raw.to_string())
    }
}

/// Parses a finite number; thousands separators and currency marks are text.
pub fn parse_number(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|parsed| parsed.is_finite())
}

pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
}

/// Header names in order; blank names become `Unnamed: {index}`.
pub fn header_names<'a, I>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    raw.into_iter()
        .enumerate()
        .map(|(idx, name)| {
            if name.trim().is_empty() {
                format!("Unnamed: {idx}")
            } else {
                name.to_string()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn missing_tokens_and_blanks_become_none() {
        assert_eq!(cell_from_raw(""), None);
        assert_eq!(cell_from_raw("   "), None);
        assert_eq!(cell_from_raw("NA"), None);
        assert_eq!(cell_from_raw(" null "), None);
        assert_eq!(cell_from_raw("Nan"), Some("Nan".to_string()));
        assert_eq!(cell_from_raw(" Ana "), Some(" Ana ".to_string()));
    }

    #[test]
    fn parse_number_accepts_common_float_forms() {
        assert_eq!(parse_number("30"), Some(30.0));
        assert_eq!(parse_number(" -2.5 "), Some(-2.5));
        assert_eq!(parse_number("1e3"), Some(1000.0));
        assert_eq!(parse_number(".5"), Some(0.5));
        assert_eq!(parse_number("1,234"), None);
        assert_eq!(parse_number("$12"), None);
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn parse_timestamp_requires_year_first_date_and_time() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2024-05-06 14:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-06T14:30"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-06"), None);
        assert_eq!(parse_timestamp("06/05/2024 14:30:00"), None);
    }

    #[test]
    fn header_names_fill_blanks_by_position() {
        assert_eq!(
            header_names(["id", "", " ", "id"]),
            vec!["id", "Unnamed: 1", "Unnamed: 2", "id"]
        );
    }
}
