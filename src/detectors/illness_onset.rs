//! Illness onset detector
//!
//! Compares a baseline period (first 70% of the window) with the recent
//! period. A rising resting-like heart rate together with falling HRV is an
//! early sign of a cold or another inflammatory process.

use super::{clamp01, Finding, InsufficientReason, Outcome};
use crate::series::{median_value, resting_like_median, split_baseline_recent};
use crate::types::{Condition, Sample, Severity};
use tracing::debug;

/// Minimum heart rate samples to evaluate a trend
pub const MIN_HEART_SAMPLES: usize = 20;

/// Minimum HRV samples to evaluate a trend
pub const MIN_HRV_SAMPLES: usize = 10;

/// Resting heart rate increase that saturates its half of the score (bpm)
const HR_INCREASE_FULL_SCALE: f64 = 10.0;

/// Relative HRV drop that saturates its half of the score
const HRV_DROP_FULL_SCALE: f64 = 0.35;

/// Score illness onset risk from heart rate and HRV trends
pub fn assess(heart: &[Sample], hrv: &[Sample]) -> Finding {
    if heart.len() < MIN_HEART_SAMPLES || hrv.len() < MIN_HRV_SAMPLES {
        return Finding::insufficient(Condition::IllnessOnset, InsufficientReason::TooFewSamples);
    }

    let (heart_base, heart_recent) = split_baseline_recent(heart);
    let (hrv_base, hrv_recent) = split_baseline_recent(hrv);

    let base_rest_hr = resting_like_median(&values(heart_base));
    let recent_rest_hr = resting_like_median(&values(heart_recent));
    let base_hrv = median_value(hrv_base);
    let recent_hrv = median_value(hrv_recent);

    let (base_rest_hr, recent_rest_hr, base_hrv, recent_hrv) =
        match (base_rest_hr, recent_rest_hr, base_hrv, recent_hrv) {
            (Some(a), Some(b), Some(c), Some(d)) if c != 0.0 => (a, b, c, d),
            _ => {
                return Finding::insufficient(
                    Condition::IllnessOnset,
                    InsufficientReason::UnstableBaseline,
                )
            }
        };

    let hr_increase = recent_rest_hr - base_rest_hr;
    let hrv_drop_pct = ((base_hrv - recent_hrv) / base_hrv).max(0.0);

    let score = (clamp01(hr_increase / HR_INCREASE_FULL_SCALE) * 0.5
        + clamp01(hrv_drop_pct / HRV_DROP_FULL_SCALE) * 0.5)
        .min(1.0);
    let confidence =
        ((heart.len() as f64 / 180.0) * 0.6 + (hrv.len() as f64 / 90.0) * 0.4).min(1.0);

    debug!(hr_increase, hrv_drop_pct, score, confidence, "illness onset scored");

    Finding::scored(
        Condition::IllnessOnset,
        score,
        confidence,
        Severity::from_score(score, 0.7, 0.4),
        Outcome::IllnessOnset {
            hr_increase,
            hrv_change_pct: (recent_hrv - base_hrv) / base_hrv * 100.0,
        },
    )
}

fn values(points: &[Sample]) -> Vec<f64> {
    points.iter().map(|p| p.value).collect()
}
