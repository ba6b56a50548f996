//! Point normalization
//!
//! Turns raw `(timestamp, value)` rows into numeric samples.
//! - Numeric values pass through
//! - Text values are trimmed and a decimal comma becomes a decimal point
//! - Rows without a timestamp or a finite value are dropped

use crate::types::{RawRow, RawValue, Sample};
use tracing::warn;

/// Normalizer for converting raw rows to samples
pub struct Normalizer;

impl Normalizer {
    /// Normalize rows, preserving their order
    ///
    /// The caller is expected to pass rows in ascending time order; nothing
    /// is sorted here.
    pub fn normalize<'a, I>(rows: I) -> Vec<Sample>
    where
        I: IntoIterator<Item = &'a RawRow>,
    {
        let mut dropped = 0usize;
        let mut samples = Vec::new();

        for row in rows {
            let value = row.value.as_ref().and_then(parse_value);
            match (row.timestamp, value) {
                (Some(timestamp), Some(value)) => samples.push(Sample { timestamp, value }),
                _ => dropped += 1,
            }
        }

        if dropped > 0 {
            warn!(dropped, kept = samples.len(), "dropped unusable rows");
        }

        samples
    }
}

/// Parse a raw value into a finite number
pub fn parse_value(raw: &RawValue) -> Option<f64> {
    match raw {
        RawValue::Number(value) => Some(*value).filter(|v| v.is_finite()),
        RawValue::Text(text) => parse_text(text),
        RawValue::Other(value) => parse_text(&value.to_string()),
    }
}

fn parse_text(text: &str) -> Option<f64> {
    let cleaned = text.trim().replace(',', ".");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
