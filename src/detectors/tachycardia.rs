//! Tachycardia detector
//!
//! Counts heart rate samples at or above 100 bpm.

use super::{Finding, InsufficientReason, Outcome};
use crate::types::{Condition, Sample, Severity};
use tracing::debug;

/// Heart rate at or above this is tachycardic (bpm)
pub const TACHYCARDIA_BPM: f64 = 100.0;

/// Score tachycardia risk over a window
pub fn assess(heart: &[Sample]) -> Finding {
    if heart.is_empty() {
        return Finding::insufficient(Condition::Tachycardia, InsufficientReason::TooFewSamples);
    }

    let episodes = heart.iter().filter(|p| p.value >= TACHYCARDIA_BPM).count() as u32;
    let score = (f64::from(episodes) * 0.03).min(1.0);
    let confidence = (heart.len() as f64 / 300.0).min(1.0);

    debug!(episodes, score, confidence, "tachycardia scored");

    Finding::scored(
        Condition::Tachycardia,
        score,
        confidence,
        Severity::from_score(score, 0.7, 0.35),
        Outcome::Tachycardia { episodes },
    )
}
