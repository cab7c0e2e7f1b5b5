use crate::{delimiter, encoding, preview, sniff};

/// Knobs for the decoding/parsing cascade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CascadeConfig {
    /// Prefix length inspected by encoding detection.
    pub encoding_probe_bytes: usize,
    /// Lines counted when guessing the delimiter for the first stage.
    pub delimiter_sample_lines: usize,
    /// Decoded prefix handed to the dialect sniffer.
    pub sniff_sample_bytes: usize,
    /// Minimum dominance of the modal per-line delimiter count.
    pub sniff_consistency: f64,
    /// Whether the line-splitting last resort runs at all.
    pub manual_fallback: bool,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            encoding_probe_bytes: encoding::DEFAULT_PROBE_BYTES,
            delimiter_sample_lines: delimiter::DEFAULT_SAMPLE_LINES,
            sniff_sample_bytes: sniff::DEFAULT_SAMPLE_BYTES,
            sniff_consistency: sniff::DEFAULT_CONSISTENCY,
            manual_fallback: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IngestConfig {
    pub cascade: CascadeConfig,
    pub preview_rows: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            cascade: CascadeConfig::default(),
            preview_rows: preview::DEFAULT_PREVIEW_ROWS,
        }
    }
}
