//! Sleep apnea detector
//!
//! Looks for respiratory depressions (rate below 10 breaths/min) and checks
//! whether the heart reacted around the same time: a heart rate spike or an
//! HRV drop within two minutes of the low reading.
//!
//! Two passes share this logic:
//! - [`assess`] aggregates the whole window into a risk score
//! - [`extract_events`] materializes individual episodes for persistence

use super::{Finding, InsufficientReason, Outcome};
use crate::series::{filter_to_segments, median, median_value, nearest_value, seconds_between};
use crate::types::{ApneaEvent, ApneaSeverity, Condition, Sample, Severity, SignalEvidence, SleepSegment};
use tracing::debug;

/// Respiratory rate below this is a depression event (breaths/min)
pub const LOW_RESPIRATORY_RATE: f64 = 10.0;

/// How far to look for a matching heart rate / HRV sample (seconds)
pub const CORRELATION_WINDOW_SECS: f64 = 120.0;

/// Heart rate above median by this much counts as a spike (bpm)
pub const HR_SPIKE_BPM: f64 = 12.0;

/// HRV at or below this fraction of median counts as a drop
pub const HRV_DROP_RATIO: f64 = 0.8;

const LOW_RESPIRATORY_WEIGHT: f64 = 0.10;
const HR_SPIKE_WEIGHT: f64 = 0.18;
const HRV_DROP_WEIGHT: f64 = 0.22;

/// Minimum spacing between respiratory samples for an episode (seconds)
pub const MIN_EPISODE_SECS: f64 = 10.0;

/// Respiratory samples used for the local baseline of an episode
pub const RESPIRATORY_BASELINE_SAMPLES: usize = 10;

/// Default `detected_by` tag for extracted events
pub const DEFAULT_DETECTED_BY: &str = "rule_engine_v1";

/// Score sleep apnea risk over a window
///
/// When `sleep_segments` is non-empty every series is first restricted to
/// samples inside at least one segment.
pub fn assess(
    respiratory: &[Sample],
    heart: &[Sample],
    hrv: &[Sample],
    sleep_segments: &[SleepSegment],
) -> Finding {
    let respiratory = filter_to_segments(respiratory, sleep_segments);
    let heart = filter_to_segments(heart, sleep_segments);
    let hrv = filter_to_segments(hrv, sleep_segments);

    if respiratory.is_empty() {
        return Finding::insufficient(Condition::SleepApnea, InsufficientReason::TooFewSamples);
    }

    let evidence = collect_evidence(&respiratory, &heart, &hrv);

    let score = (f64::from(evidence.low_respiratory_events) * LOW_RESPIRATORY_WEIGHT
        + f64::from(evidence.hr_spike_events) * HR_SPIKE_WEIGHT
        + f64::from(evidence.hrv_drop_events) * HRV_DROP_WEIGHT)
        .min(1.0);

    let resp_count = respiratory.len() as f64;
    let signal_coverage = ((heart.len() + hrv.len()) as f64 / resp_count.max(1.0)).min(1.0);
    let confidence = ((resp_count / 120.0) * 0.6 + signal_coverage * 0.4).min(1.0);

    debug!(
        low = evidence.low_respiratory_events,
        hr_spikes = evidence.hr_spike_events,
        hrv_drops = evidence.hrv_drop_events,
        score,
        confidence,
        "sleep apnea scored"
    );

    Finding::scored(
        Condition::SleepApnea,
        score,
        confidence,
        Severity::from_score(score, 0.75, 0.45),
        Outcome::SleepApnea { evidence },
    )
}

fn collect_evidence(respiratory: &[Sample], heart: &[Sample], hrv: &[Sample]) -> SignalEvidence {
    let baseline_hr = median_value(heart);
    let baseline_hrv = median_value(hrv);

    let mut evidence = SignalEvidence {
        data_points: respiratory.len() as u32,
        ..Default::default()
    };

    for point in respiratory.iter().filter(|p| p.value < LOW_RESPIRATORY_RATE) {
        evidence.low_respiratory_events += 1;

        let hr_near = nearest_value(heart, point.timestamp, CORRELATION_WINDOW_SECS);
        if let (Some(hr), Some(base)) = (hr_near, baseline_hr) {
            if hr >= base + HR_SPIKE_BPM {
                evidence.hr_spike_events += 1;
            }
        }

        let hrv_near = nearest_value(hrv, point.timestamp, CORRELATION_WINDOW_SECS);
        if let (Some(value), Some(base)) = (hrv_near, baseline_hrv) {
            if value <= base * HRV_DROP_RATIO {
                evidence.hrv_drop_events += 1;
            }
        }
    }

    evidence
}

/// Extract candidate apnea episodes
///
/// Every adjacent pair of respiratory samples whose second reading is low and
/// that are at least ten seconds apart becomes one event spanning the pair.
pub fn extract_events(
    respiratory: &[Sample],
    heart: &[Sample],
    hrv: &[Sample],
    sleep_segments: &[SleepSegment],
    detected_by: &str,
) -> Vec<ApneaEvent> {
    let respiratory = filter_to_segments(respiratory, sleep_segments);
    let heart = filter_to_segments(heart, sleep_segments);
    let hrv = filter_to_segments(hrv, sleep_segments);

    if respiratory.len() < 2 {
        return Vec::new();
    }

    let heart_baseline = median_value(&heart);
    let hrv_baseline = median_value(&hrv);

    let mut events = Vec::new();
    for (idx, pair) in respiratory.windows(2).enumerate() {
        let (prev, current) = (pair[0], pair[1]);
        let idx = idx + 1;

        if current.value >= LOW_RESPIRATORY_RATE {
            continue;
        }
        if seconds_between(prev.timestamp, current.timestamp) < MIN_EPISODE_SECS {
            continue;
        }

        let respiratory_rate_drop = if idx >= RESPIRATORY_BASELINE_SAMPLES {
            let window: Vec<f64> = respiratory[idx - RESPIRATORY_BASELINE_SAMPLES..idx]
                .iter()
                .map(|p| p.value)
                .collect();
            median(&window).map(|base| (base - current.value).max(0.0))
        } else {
            None
        };

        let heart_rate_spike = nearest_value(&heart, current.timestamp, CORRELATION_WINDOW_SECS)
            .zip(heart_baseline)
            .map(|(near, base)| near - base);

        let hrv_change = nearest_value(&hrv, current.timestamp, CORRELATION_WINDOW_SECS)
            .zip(hrv_baseline)
            .map(|(near, base)| near - base);

        events.push(ApneaEvent {
            start_time: prev.timestamp,
            end_time: current.timestamp,
            respiratory_rate_drop,
            heart_rate_spike,
            hrv_change,
            severity: classify_episode(respiratory_rate_drop, heart_rate_spike, hrv_change),
            detected_by: detected_by.to_string(),
        });
    }

    debug!(events = events.len(), "apnea events extracted");
    events
}

/// Two-stage episode severity: moderate first, then severe on top
fn classify_episode(
    respiratory_rate_drop: Option<f64>,
    heart_rate_spike: Option<f64>,
    hrv_change: Option<f64>,
) -> ApneaSeverity {
    let mut severity = ApneaSeverity::Mild;

    if heart_rate_spike.is_some_and(|s| s >= 20.0) || respiratory_rate_drop.is_some_and(|d| d >= 4.0) {
        severity = ApneaSeverity::Moderate;
    }
    if heart_rate_spike.is_some_and(|s| s >= 30.0) && hrv_change.is_some_and(|c| c <= -10.0) {
        severity = ApneaSeverity::Severe;
    }

    severity
}
