//! Engine configuration
//!
//! Scoring constants are fixed in the detectors; configuration only covers
//! how the engine is driven.

use crate::detectors::sleep_apnea::DEFAULT_DETECTED_BY;
use crate::error::RiskError;
use crate::types::SleepSegment;
use crate::window::TimeWindow;
use serde::{Deserialize, Serialize};

/// Configuration for [`crate::pipeline::RiskEngine`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Tag stored with every extracted apnea event
    pub detected_by: String,
    /// Windows for which apnea events are extracted
    pub event_windows: Vec<TimeWindow>,
    /// Sleep periods used to restrict the sleep apnea detector
    pub sleep_segments: Vec<SleepSegment>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            detected_by: DEFAULT_DETECTED_BY.to_string(),
            event_windows: vec![TimeWindow::Night],
            sleep_segments: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, RiskError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, RiskError> {
        serde_json::to_string_pretty(self).map_err(RiskError::JsonError)
    }

    pub fn validate(&self) -> Result<(), RiskError> {
        if self.detected_by.trim().is_empty() {
            return Err(RiskError::ConfigError(
                "detected_by must not be empty".to_string(),
            ));
        }
        if let Some(segment) = self.sleep_segments.iter().find(|s| s.start > s.end) {
            return Err(RiskError::ConfigError(format!(
                "sleep segment ends before it starts: {} > {}",
                segment.start, segment.end
            )));
        }
        Ok(())
    }

    pub fn extracts_events(&self, window: TimeWindow) -> bool {
        self.event_windows.contains(&window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.detected_by, "rule_engine_v1");
        assert!(config.extracts_events(TimeWindow::Night));
        assert!(!config.extracts_events(TimeWindow::Week));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json(r#"{"detected_by": "rule_engine_v2"}"#).unwrap();
        assert_eq!(config.detected_by, "rule_engine_v2");
        assert_eq!(config.event_windows, vec![TimeWindow::Night]);
        assert!(config.sleep_segments.is_empty());
    }

    #[test]
    fn test_sleep_segments_from_json() {
        let config = EngineConfig::from_json(
            r#"{"sleep_segments": [{"start": "2026-02-25T23:00:00", "end": "2026-02-26T07:00:00"}]}"#,
        )
        .unwrap();
        assert_eq!(config.sleep_segments.len(), 1);
    }

    #[test]
    fn test_invalid_config() {
        assert!(EngineConfig::from_json(r#"{"detected_by": " "}"#).is_err());
        assert!(EngineConfig::from_json(
            r#"{"sleep_segments": [{"start": "2026-02-26T07:00:00", "end": "2026-02-25T23:00:00"}]}"#,
        )
        .is_err());
        assert!(EngineConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_round_trip() {
        let config = EngineConfig::default();
        let loaded = EngineConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(config, loaded);
    }
}
