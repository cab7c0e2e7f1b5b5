use std::fmt;

use serde::{Deserialize, Serialize};

/// Field separators the ingestion pipeline knows how to detect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    Comma,
    Semicolon,
    Tab,
    Pipe,
}

/// Candidate order doubles as the tie-break order.
pub const CANDIDATES: [Delimiter; 4] = [
    Delimiter::Comma,
    Delimiter::Semicolon,
    Delimiter::Tab,
    Delimiter::Pipe,
];

pub const DEFAULT_SAMPLE_LINES: usize = 5;

impl Delimiter {
    pub fn as_byte(self) -> u8 {
        match self {
            Delimiter::Comma => b',',
            Delimiter::Semicolon => b';',
            Delimiter::Tab => b'\t',
            Delimiter::Pipe => b'|',
        }
    }

    pub fn as_char(self) -> char {
        self.as_byte() as char
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        CANDIDATES.into_iter().find(|d| d.as_byte() == byte)
    }

    pub fn printable(self) -> &'static str {
        match self {
            Delimiter::Comma => ",",
            Delimiter::Semicolon => ";",
            Delimiter::Tab => "\\t",
            Delimiter::Pipe => "|",
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.printable())
    }
}

/// Returns the candidate with the most literal occurrences in `sample`.
///
/// Ties keep the earlier candidate; a sample without any candidate (or an empty
/// candidate list) yields [`Delimiter::Comma`].
pub fn detect(sample: &str, candidates: &[Delimiter]) -> Delimiter {
    let mut best = Delimiter::Comma;
    let mut best_count = 0usize;
    for &candidate in candidates {
        let count = sample.matches(candidate.as_char()).count();
        if count > best_count {
            best = candidate;
            best_count = count;
        }
    }
    best
}

/// Borrow the first `lines` lines of `text`, terminators included.
pub fn sample_lines(text: &str, lines: usize) -> &str {
    if lines == 0 {
        return "";
    }
    match text.match_indices('\n').nth(lines - 1) {
        Some((idx, _)) => &text[..=idx],
        None => text,
    }
}
