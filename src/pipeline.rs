//! Pipeline orchestration
//!
//! This module provides the public API for Synheart Risk. For each window it
//! fetches the three signal series, normalizes them once, runs the detectors
//! and, for event windows, extracts apnea events.

use crate::config::EngineConfig;
use crate::detectors::{illness_onset, sleep_apnea, tachycardia};
use crate::encoder::AssessmentEncoder;
use crate::error::RiskError;
use crate::normalizer::Normalizer;
use crate::store::{EventStore, SampleSource};
use crate::types::{ApneaEvent, RiskAssessment, Sample, SignalKind};
use crate::window::TimeWindow;
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

/// Result of evaluating one window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowReport {
    pub report_id: String,
    pub window: TimeWindow,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Sleep apnea, tachycardia, illness onset, in that order
    pub assessments: Vec<RiskAssessment>,
    /// Apnea events extracted for this window (empty for non-event windows)
    pub events: Vec<ApneaEvent>,
    /// Events newly written by [`RiskEngine::store_events`]
    pub inserted_events: usize,
}

/// Normalized series for one window
#[derive(Debug, Clone, Default)]
pub struct WindowSeries {
    pub respiratory: Vec<Sample>,
    pub heart: Vec<Sample>,
    pub hrv: Vec<Sample>,
}

/// Stateless risk engine
///
/// Holds only configuration, so one engine can evaluate any number of
/// windows, including concurrently from several threads.
#[derive(Debug, Clone, Default)]
pub struct RiskEngine {
    config: EngineConfig,
    encoder: AssessmentEncoder,
}

impl RiskEngine {
    /// Create an engine with default settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            encoder: AssessmentEncoder::new(),
        }
    }

    /// Fetch and normalize the three series for `[start, end]`
    pub fn load_series(
        &self,
        source: &dyn SampleSource,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<WindowSeries, RiskError> {
        let fetch = |kind: SignalKind| -> Result<Vec<Sample>, RiskError> {
            let rows = source.fetch(kind, start, end)?;
            let samples = Normalizer::normalize(&rows);
            debug!(kind = %kind, rows = rows.len(), samples = samples.len(), "series loaded");
            Ok(samples)
        };

        Ok(WindowSeries {
            respiratory: fetch(SignalKind::RespiratoryRate)?,
            heart: fetch(SignalKind::HeartRate)?,
            hrv: fetch(SignalKind::HeartRateVariability)?,
        })
    }

    /// Evaluate the detectors on already normalized series
    pub fn evaluate(
        &self,
        series: &WindowSeries,
        window: TimeWindow,
        created_at: NaiveDateTime,
    ) -> Vec<RiskAssessment> {
        let segments = &self.config.sleep_segments;
        let findings = [
            sleep_apnea::assess(&series.respiratory, &series.heart, &series.hrv, segments),
            tachycardia::assess(&series.heart),
            illness_onset::assess(&series.heart, &series.hrv),
        ];

        findings
            .iter()
            .map(|finding| self.encoder.encode_at(finding, window, created_at))
            .collect()
    }

    /// Extract apnea events from already normalized series
    pub fn extract_events(&self, series: &WindowSeries) -> Vec<ApneaEvent> {
        sleep_apnea::extract_events(
            &series.respiratory,
            &series.heart,
            &series.hrv,
            &self.config.sleep_segments,
            &self.config.detected_by,
        )
    }

    /// Evaluate one window ending at `now` (current UTC time when `None`)
    pub fn analyze_window(
        &self,
        source: &dyn SampleSource,
        window: TimeWindow,
        now: Option<NaiveDateTime>,
    ) -> Result<WindowReport, RiskError> {
        let now = now.unwrap_or_else(|| Utc::now().naive_utc());
        let (start, end) = window.resolve(now);

        let series = self.load_series(source, start, end)?;
        let assessments = self.evaluate(&series, window, Utc::now().naive_utc());
        let events = if self.config.extracts_events(window) {
            self.extract_events(&series)
        } else {
            Vec::new()
        };

        for assessment in &assessments {
            info!(
                window = %window,
                condition = %assessment.condition,
                score = assessment.score,
                confidence = assessment.confidence,
                severity = %assessment.severity,
                "assessment computed"
            );
        }

        Ok(WindowReport {
            report_id: Uuid::new_v4().to_string(),
            window,
            start,
            end,
            assessments,
            events,
            inserted_events: 0,
        })
    }

    /// Evaluate night, week and month with the same reference instant
    pub fn analyze_all_windows(
        &self,
        source: &dyn SampleSource,
        now: Option<NaiveDateTime>,
    ) -> Result<Vec<WindowReport>, RiskError> {
        let now = now.unwrap_or_else(|| Utc::now().naive_utc());
        TimeWindow::ALL
            .iter()
            .map(|&window| self.analyze_window(source, window, Some(now)))
            .collect()
    }

    /// Hand a report's events to the store and record how many were new
    pub fn store_events(
        &self,
        store: &mut dyn EventStore,
        report: &mut WindowReport,
    ) -> Result<usize, RiskError> {
        if report.events.is_empty() {
            return Ok(0);
        }
        let inserted = store.insert_events(&report.events)?;
        report.inserted_events = inserted;
        info!(
            window = %report.window,
            extracted = report.events.len(),
            inserted,
            "apnea events stored"
        );
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryEventStore, MemorySampleStore};
    use crate::types::{Condition, RawRow, Severity, SleepSegment};
    use chrono::{Duration, NaiveDate};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, 26)
            .unwrap()
            .and_hms_opt(2, 0, 0)
            .unwrap()
    }

    /// One hour of minute samples ending at `now`, with a dip every 10 minutes
    fn night_store() -> MemorySampleStore {
        let mut store = MemorySampleStore::new();
        for i in 0..60i64 {
            let ts = now() - Duration::minutes(60 - i);
            let dip = i % 10 == 0;
            store.push(
                SignalKind::RespiratoryRate,
                RawRow::new(ts, if dip { "7" } else { "13,0" }),
            );
            store.push(SignalKind::HeartRate, RawRow::new(ts, if dip { 95 } else { 72 }));
            store.push(
                SignalKind::HeartRateVariability,
                RawRow::new(ts, if dip { 24 } else { 40 }),
            );
        }
        store
    }

    struct FailingSource;

    impl SampleSource for FailingSource {
        fn fetch(
            &self,
            _kind: SignalKind,
            _start: NaiveDateTime,
            _end: NaiveDateTime,
        ) -> Result<Vec<RawRow>, RiskError> {
            Err(RiskError::SourceError("connection refused".to_string()))
        }
    }

    #[test]
    fn test_night_window_report() {
        let engine = RiskEngine::new();
        let report = engine
            .analyze_window(&night_store(), TimeWindow::Night, Some(now()))
            .unwrap();

        assert_eq!(report.start, now() - Duration::hours(12));
        assert_eq!(report.end, now());

        let conditions: Vec<Condition> = report.assessments.iter().map(|a| a.condition).collect();
        assert_eq!(
            conditions,
            vec![Condition::SleepApnea, Condition::Tachycardia, Condition::IllnessOnset]
        );

        let apnea = &report.assessments[0];
        assert!(apnea.score > 0.4);
        assert!(matches!(apnea.severity, Severity::Medium | Severity::High));

        // every dip after the first sample forms an episode
        assert_eq!(report.events.len(), 5);
        assert!(report.events.iter().all(|e| e.detected_by == "rule_engine_v1"));
    }

    #[test]
    fn test_week_window_has_no_events() {
        let engine = RiskEngine::new();
        let report = engine
            .analyze_window(&night_store(), TimeWindow::Week, Some(now()))
            .unwrap();
        assert!(report.events.is_empty());
        assert_eq!(report.assessments.len(), 3);
    }

    #[test]
    fn test_all_windows_in_order() {
        let engine = RiskEngine::new();
        let reports = engine
            .analyze_all_windows(&MemorySampleStore::new(), Some(now()))
            .unwrap();

        let windows: Vec<TimeWindow> = reports.iter().map(|r| r.window).collect();
        assert_eq!(windows, TimeWindow::ALL.to_vec());
        for report in &reports {
            assert!(report
                .assessments
                .iter()
                .all(|a| a.severity == Severity::Unknown && a.score == 0.0));
        }
    }

    #[test]
    fn test_all_windows_share_current_instant() {
        let engine = RiskEngine::new();
        let reports = engine
            .analyze_all_windows(&MemorySampleStore::new(), None)
            .unwrap();

        assert_eq!(reports.len(), 3);
        let end = reports[0].end;
        assert!(reports.iter().all(|r| r.end == end));
        assert_eq!(reports[2].start, end - Duration::days(30));
    }

    #[test]
    fn test_store_events_is_idempotent() {
        let engine = RiskEngine::new();
        let source = night_store();
        let mut store = MemoryEventStore::new();

        let mut first = engine
            .analyze_window(&source, TimeWindow::Night, Some(now()))
            .unwrap();
        assert_eq!(engine.store_events(&mut store, &mut first).unwrap(), 5);
        assert_eq!(first.inserted_events, 5);

        let mut second = engine
            .analyze_window(&source, TimeWindow::Night, Some(now()))
            .unwrap();
        assert_eq!(engine.store_events(&mut store, &mut second).unwrap(), 0);
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_analysis_is_repeatable() {
        let engine = RiskEngine::new();
        let source = night_store();
        let a = engine.analyze_window(&source, TimeWindow::Night, Some(now())).unwrap();
        let b = engine.analyze_window(&source, TimeWindow::Night, Some(now())).unwrap();

        for (x, y) in a.assessments.iter().zip(&b.assessments) {
            assert_eq!(x.score, y.score);
            assert_eq!(x.confidence, y.confidence);
            assert_eq!(x.severity, y.severity);
        }
        assert_eq!(a.events, b.events);
    }

    #[test]
    fn test_sleep_segments_from_config() {
        let config = EngineConfig {
            sleep_segments: vec![SleepSegment::new(
                now() - Duration::minutes(55),
                now() - Duration::minutes(52),
            )],
            ..Default::default()
        };
        let engine = RiskEngine::with_config(config);
        let report = engine
            .analyze_window(&night_store(), TimeWindow::Night, Some(now()))
            .unwrap();

        assert_eq!(report.assessments[0].severity, Severity::None);
        assert!(report.events.is_empty());
        // other detectors see the full series
        assert_eq!(report.assessments[1].severity, Severity::None);
        assert_ne!(report.assessments[2].severity, Severity::Unknown);
    }

    #[test]
    fn test_source_errors_propagate() {
        let engine = RiskEngine::new();
        let err = engine
            .analyze_window(&FailingSource, TimeWindow::Night, Some(now()))
            .unwrap_err();
        assert!(matches!(err, RiskError::SourceError(_)));
    }
}
