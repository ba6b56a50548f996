//! Rule-based detectors
//!
//! Each detector is a pure function of its input series. Detectors return a
//! [`Finding`]: the numeric result plus a structured description of what was
//! observed. Turning a finding into text is the encoder's job.

pub mod illness_onset;
pub mod sleep_apnea;
pub mod tachycardia;

use crate::interpretation::{interpret, Interpretation};
use crate::types::{Condition, Severity, SignalEvidence};
use serde::{Deserialize, Serialize};

/// Why a detector declined to score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsufficientReason {
    /// Not enough samples to run the rule
    TooFewSamples,
    /// Samples were present but the baseline statistics collapsed
    UnstableBaseline,
}

/// What a detector observed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    SleepApnea { evidence: SignalEvidence },
    Tachycardia { episodes: u32 },
    IllnessOnset {
        /// Resting-like heart rate increase, recent vs baseline (bpm)
        hr_increase: f64,
        /// HRV change, recent vs baseline (percent, signed)
        hrv_change_pct: f64,
    },
    InsufficientData { reason: InsufficientReason },
}

/// Result of running one detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub condition: Condition,
    /// Raw risk score (0-1)
    pub score: f64,
    /// Raw confidence (0-1)
    pub confidence: f64,
    pub severity: Severity,
    pub interpretation: Interpretation,
    pub outcome: Outcome,
}

impl Finding {
    /// Scored finding; interpretation follows from score and confidence
    pub(crate) fn scored(
        condition: Condition,
        score: f64,
        confidence: f64,
        severity: Severity,
        outcome: Outcome,
    ) -> Self {
        Self {
            condition,
            score,
            confidence,
            severity,
            interpretation: interpret(score, confidence),
            outcome,
        }
    }

    /// Sentinel for an assessment that could not be made
    pub(crate) fn insufficient(condition: Condition, reason: InsufficientReason) -> Self {
        Self {
            condition,
            score: 0.0,
            confidence: 0.0,
            severity: Severity::Unknown,
            interpretation: Interpretation::InsufficientData,
            outcome: Outcome::InsufficientData { reason },
        }
    }

    pub fn is_insufficient(&self) -> bool {
        matches!(self.outcome, Outcome::InsufficientData { .. })
    }
}

/// Clamp to the unit interval
pub(crate) fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}
