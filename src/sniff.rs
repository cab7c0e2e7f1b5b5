//! Dialect sniffing over a bounded text sample.
//!
//! [`csv_nose::Sniffer`] proposes a delimiter and quote. The proposal is kept
//! only when the delimiter is one of [`CANDIDATES`] and the modal per-record
//! field count dominates the sample by at least the consistency threshold.

use std::collections::BTreeMap;

use csv_nose::{Quote, SampleSize, Sniffer};
use log::debug;
use serde::Serialize;

use crate::{
    delimiter::{CANDIDATES, Delimiter},
    io_utils,
};

pub const DEFAULT_SAMPLE_BYTES: usize = 4096;
pub const DEFAULT_CONSISTENCY: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dialect {
    pub delimiter: Delimiter,
    pub quote: Option<u8>,
    pub skip_initial_space: bool,
}

pub fn sniff(sample: &str, consistency: f64) -> Option<Dialect> {
    if sample.trim().is_empty() {
        return None;
    }
    let mut sniffer = Sniffer::new();
    sniffer.sample_size(SampleSize::Bytes(sample.len()));
    let metadata = match sniffer.sniff_bytes(sample.as_bytes()) {
        Ok(metadata) => metadata,
        Err(err) => {
            debug!("Sniffer found no dialect: {err}");
            return None;
        }
    };

    let raw = metadata.dialect.delimiter;
    let Some(delimiter) = Delimiter::from_byte(raw).filter(|d| CANDIDATES.contains(d)) else {
        debug!(
            "Sniffed delimiter {:?} is not a candidate delimiter",
            char::from(raw)
        );
        return None;
    };
    let quote = if let Quote::Some(quote) = metadata.dialect.quote {
        Some(quote)
    } else {
        None
    };

    let score = consistency_score(sample, delimiter, quote);
    if score < consistency {
        debug!(
            "Sniffed delimiter '{}' scored {:.2} below consistency {:.2}",
            delimiter, score, consistency
        );
        return None;
    }
    Some(Dialect {
        delimiter,
        quote,
        skip_initial_space: skips_initial_space(sample, delimiter),
    })
}

/// Share of records holding the modal field count, less the share that does
/// not. Blank lines are ignored; a modal count of one field scores zero.
fn consistency_score(sample: &str, delimiter: Delimiter, quote: Option<u8>) -> f64 {
    let mut reader =
        io_utils::open_csv_reader(sample.as_bytes(), delimiter.as_byte(), false, true, quote);
    let mut frequencies: BTreeMap<usize, usize> = BTreeMap::new();
    for record in reader.records() {
        let Ok(record) = record else {
            return 0.0;
        };
        if io_utils::is_blank_record(&record) {
            continue;
        }
        *frequencies.entry(record.len()).or_insert(0) += 1;
    }

    let total: usize = frequencies.values().sum();
    let Some((&mode, &mode_records)) = frequencies
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
    else {
        return 0.0;
    };
    if mode <= 1 {
        return 0.0;
    }
    let others = total - mode_records;
    mode_records.saturating_sub(others) as f64 / total as f64
}

fn skips_initial_space(sample: &str, delimiter: Delimiter) -> bool {
    let occurrences = sample.matches(delimiter.as_char()).count();
    let spaced_pattern = format!("{} ", delimiter.as_char());
    let spaced = sample.matches(spaced_pattern.as_str()).count();
    occurrences > 0 && spaced == occurrences
}
