//! Decoding and csv reader construction shared by the cascade stages.
//!
//! - **Strict decoding** fails on malformed input so a stage can advance.
//! - **Lossy decoding** substitutes U+FFFD and never fails.
//! - **Readers** are built over already-decoded text, so every stage sees
//!   the same `csv` configuration apart from arity enforcement and quoting.

use std::io::Read;

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};

use crate::error::StructuralError;

/// Labels tried by the brute-force grid, outer loop first.
pub fn grid_encodings() -> [(&'static str, &'static Encoding); 4] {
    // encoding_rs follows WHATWG: the three Latin labels share one decoder.
    [
        ("utf-8", UTF_8),
        ("latin-1", WINDOWS_1252),
        ("iso-8859-1", WINDOWS_1252),
        ("cp1252", WINDOWS_1252),
    ]
}

pub fn open_csv_reader<R>(
    reader: R,
    delimiter: u8,
    has_headers: bool,
    flexible: bool,
    quote: Option<u8>,
) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(has_headers)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(flexible);
    match quote {
        Some(q) => builder.quoting(true).quote(q),
        None => builder.quoting(false),
    };
    builder.from_reader(reader)
}

/// A whitespace-only line, which the reader yields as one blank field.
pub fn is_blank_record(record: &csv::StringRecord) -> bool {
    record.len() == 1 && record.get(0).is_some_and(|field| field.trim().is_empty())
}

pub fn decode_strict(bytes: &[u8], encoding: &'static Encoding) -> Result<String, StructuralError> {
    let (text, had_errors) = encoding.decode_with_bom_removal(bytes);
    if had_errors {
        Err(StructuralError::Decode {
            encoding: encoding.name(),
        })
    } else {
        Ok(text.into_owned())
    }
}

pub fn decode_lossy(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (text, _) = encoding.decode_with_bom_removal(bytes);
    text.into_owned()
}

/// Borrow at most `limit` bytes of `text`, cut back to the last complete line.
///
/// When the prefix holds no line break the whole (char-aligned) prefix is kept.
pub fn sample_prefix(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    let prefix = &text[..end];
    match prefix.rfind('\n') {
        Some(idx) => &prefix[..=idx],
        None => prefix,
    }
}
