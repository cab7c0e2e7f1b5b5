//! Byte-encoding detection for uploaded text files.
//!
//! Detection never fails: inputs without usable signal fall back to UTF-8 with
//! zero confidence. Only a bounded prefix of the input is inspected.

use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE, WINDOWS_1252};
use serde::{Serialize, Serializer, ser::SerializeStruct};

pub const DEFAULT_PROBE_BYTES: usize = 64 * 1024;

/// Share of zero bytes at alternating positions that marks BOM-less UTF-16.
const UTF16_ZERO_RATIO: f64 = 0.3;
/// Multi-byte sequences after which a valid UTF-8 guess saturates.
const UTF8_SATURATION: i32 = 6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodingGuess {
    pub encoding: &'static Encoding,
    pub confidence: f64,
}

impl EncodingGuess {
    pub fn fallback() -> Self {
        Self {
            encoding: UTF_8,
            confidence: 0.0,
        }
    }

    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }
}

impl Serialize for EncodingGuess {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("EncodingGuess", 2)?;
        state.serialize_field("encoding", self.encoding.name())?;
        state.serialize_field("confidence", &self.confidence)?;
        state.end()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EncodingDetector {
    probe_bytes: usize,
}

impl Default for EncodingDetector {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_BYTES)
    }
}

impl EncodingDetector {
    pub fn new(probe_bytes: usize) -> Self {
        Self {
            probe_bytes: probe_bytes.max(4),
        }
    }

    pub fn detect(&self, bytes: &[u8]) -> EncodingGuess {
        if bytes.is_empty() {
            return EncodingGuess::fallback();
        }
        if let Some((encoding, _)) = Encoding::for_bom(bytes) {
            return EncodingGuess {
                encoding,
                confidence: 1.0,
            };
        }

        let probe = &bytes[..bytes.len().min(self.probe_bytes)];
        let truncated = probe.len() < bytes.len();

        if let Some(confidence) = utf8_confidence(probe, truncated) {
            return EncodingGuess {
                encoding: UTF_8,
                confidence,
            };
        }
        if let Some(encoding) = bomless_utf16(probe) {
            return EncodingGuess {
                encoding,
                confidence: 0.6,
            };
        }
        EncodingGuess {
            encoding: WINDOWS_1252,
            confidence: single_byte_confidence(probe),
        }
    }
}

fn utf8_confidence(probe: &[u8], truncated: bool) -> Option<f64> {
    let valid = match std::str::from_utf8(probe) {
        Ok(text) => text,
        // A multi-byte sequence cut by the probe boundary is still UTF-8.
        Err(err) if truncated && err.error_len().is_none() => {
            std::str::from_utf8(&probe[..err.valid_up_to()]).ok()?
        }
        Err(_) => return None,
    };
    if valid.contains('\0') {
        return None;
    }
    let multibyte = valid.chars().filter(|c| !c.is_ascii()).count();
    if multibyte == 0 {
        return Some(1.0);
    }
    let exponent = i32::try_from(multibyte).unwrap_or(i32::MAX);
    if exponent >= UTF8_SATURATION {
        Some(0.99)
    } else {
        Some(1.0 - 0.99 * 0.5f64.powi(exponent))
    }
}

fn bomless_utf16(probe: &[u8]) -> Option<&'static Encoding> {
    let pairs = probe.len() / 2;
    if pairs < 2 {
        return None;
    }
    let even_zeros = probe.iter().step_by(2).filter(|&&b| b == 0).count();
    let odd_zeros = probe.iter().skip(1).step_by(2).filter(|&&b| b == 0).count();
    let threshold = (pairs as f64 * UTF16_ZERO_RATIO).ceil() as usize;
    if odd_zeros >= threshold && even_zeros == 0 {
        Some(UTF_16LE)
    } else if even_zeros >= threshold && odd_zeros == 0 {
        Some(UTF_16BE)
    } else {
        None
    }
}

/// Scores a windows-1252 guess by how many high bytes land on Latin letters.
fn single_byte_confidence(probe: &[u8]) -> f64 {
    let high = probe.iter().filter(|&&b| b >= 0x80).count();
    if high == 0 {
        return 0.5;
    }
    let letters = probe
        .iter()
        .filter(|&&b| b >= 0xC0 && b != 0xD7 && b != 0xF7)
        .count();
    0.5 + 0.4 * (letters as f64 / high as f64)
}
