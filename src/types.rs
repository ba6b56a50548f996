//! Core types for the Synheart Risk engine
//!
//! This module defines the data that flows through the engine: raw rows handed
//! over by a sample source, normalized samples, detector evidence, and the
//! assessments and apnea events produced at the end.

use crate::window::TimeWindow;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Physiological signal kinds the detectors consume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    RespiratoryRate,
    HeartRate,
    HeartRateVariability,
}

impl SignalKind {
    pub const ALL: [SignalKind; 3] = [
        SignalKind::RespiratoryRate,
        SignalKind::HeartRate,
        SignalKind::HeartRateVariability,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::RespiratoryRate => "respiratory_rate",
            SignalKind::HeartRate => "heart_rate",
            SignalKind::HeartRateVariability => "heart_rate_variability",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Untyped value as stored by the ingestion layer
///
/// Exports keep some measurements as text (sometimes with a decimal comma),
/// so a value is either already numeric or something numeric-like.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<i32> for RawValue {
    fn from(value: i32) -> Self {
        RawValue::Number(f64::from(value))
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

/// A `(timestamp, value)` row as returned by a sample source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    pub timestamp: Option<NaiveDateTime>,
    pub value: Option<RawValue>,
}

impl RawRow {
    pub fn new(timestamp: NaiveDateTime, value: impl Into<RawValue>) -> Self {
        Self {
            timestamp: Some(timestamp),
            value: Some(value.into()),
        }
    }
}

/// A normalized numeric sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: NaiveDateTime, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Closed time interval during which the wearer was asleep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepSegment {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl SleepSegment {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Inclusive on both ends
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        self.start <= ts && ts <= self.end
    }
}

/// Conditions scored by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    #[serde(rename = "sleep_apnea_risk")]
    SleepApnea,
    #[serde(rename = "tachycardia_risk")]
    Tachycardia,
    #[serde(rename = "illness_onset_risk")]
    IllnessOnset,
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::SleepApnea => "sleep_apnea_risk",
            Condition::Tachycardia => "tachycardia_risk",
            Condition::IllnessOnset => "illness_onset_risk",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Qualitative risk tier, ordered from least to most concerning
///
/// `Unknown` sorts lowest: it marks an assessment that could not be made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Unknown,
    None,
    Low,
    Medium,
    High,
}

impl Severity {
    /// Bucket a score: `>= high` is High, `>= medium` is Medium, any positive
    /// score is Low, otherwise None.
    pub fn from_score(score: f64, high: f64, medium: f64) -> Self {
        if score >= high {
            Severity::High
        } else if score >= medium {
            Severity::Medium
        } else if score > 0.0 {
            Severity::Low
        } else {
            Severity::None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Unknown => "unknown",
            Severity::None => "none",
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of a single extracted apnea-like episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApneaSeverity {
    Mild,
    Moderate,
    Severe,
}

/// Evidence gathered by the sleep apnea scorer for one evaluation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalEvidence {
    /// Respiratory samples below the depression threshold
    pub low_respiratory_events: u32,
    /// Of those, how many had a nearby heart rate spike
    pub hr_spike_events: u32,
    /// Of those, how many had a nearby HRV drop
    pub hrv_drop_events: u32,
    /// Respiratory samples considered
    pub data_points: u32,
}

/// Final, presentable risk assessment for one condition and window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub condition: Condition,
    pub window: TimeWindow,
    /// Risk score (0-1, 3 decimals)
    pub score: f64,
    /// Signal confidence (0-1, 3 decimals)
    pub confidence: f64,
    pub severity: Severity,
    pub interpretation: String,
    pub summary: String,
    pub recommendation: String,
    pub clinical_safety_note: String,
    pub created_at: NaiveDateTime,
}

/// Deduplication key of a persisted apnea event
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventKey {
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub detected_by: String,
}

/// A candidate apnea-like episode between two respiratory samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApneaEvent {
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    /// Drop below the median of the previous ten respiratory samples
    pub respiratory_rate_drop: Option<f64>,
    /// Nearby heart rate above the window median (bpm)
    pub heart_rate_spike: Option<f64>,
    /// Nearby HRV relative to the window median (ms)
    pub hrv_change: Option<f64>,
    pub severity: ApneaSeverity,
    pub detected_by: String,
}

impl ApneaEvent {
    pub fn key(&self) -> EventKey {
        EventKey {
            start_time: self.start_time,
            end_time: self.end_time,
            detected_by: self.detected_by.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, 26)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Unknown < Severity::None);
        assert!(Severity::None < Severity::Low);
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
    }

    #[test]
    fn test_severity_from_score() {
        assert_eq!(Severity::from_score(0.75, 0.75, 0.45), Severity::High);
        assert_eq!(Severity::from_score(0.45, 0.75, 0.45), Severity::Medium);
        assert_eq!(Severity::from_score(0.01, 0.75, 0.45), Severity::Low);
        assert_eq!(Severity::from_score(0.0, 0.75, 0.45), Severity::None);
    }

    #[test]
    fn test_sleep_segment_bounds_are_inclusive() {
        let segment = SleepSegment::new(ts(1, 0, 0), ts(2, 0, 0));
        assert!(segment.contains(ts(1, 0, 0)));
        assert!(segment.contains(ts(2, 0, 0)));
        assert!(!segment.contains(ts(2, 0, 1)));
    }

    #[test]
    fn test_serialized_identifiers() {
        assert_eq!(
            serde_json::to_value(Condition::IllnessOnset).unwrap(),
            "illness_onset_risk"
        );
        assert_eq!(serde_json::to_value(Severity::Unknown).unwrap(), "unknown");
        assert_eq!(
            serde_json::to_value(ApneaSeverity::Moderate).unwrap(),
            "moderate"
        );
        assert_eq!(
            serde_json::to_value(SignalKind::HeartRateVariability).unwrap(),
            "heart_rate_variability"
        );
    }

    #[test]
    fn test_raw_value_deserializes_numbers_and_text() {
        let number: RawValue = serde_json::from_str("72").unwrap();
        let text: RawValue = serde_json::from_str("\"72,5\"").unwrap();
        assert_eq!(number, RawValue::Number(72.0));
        assert_eq!(text, RawValue::Text("72,5".to_string()));
    }
}
