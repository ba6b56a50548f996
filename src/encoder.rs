//! Assessment encoding
//!
//! This module turns detector findings into presentable assessments and
//! serializable report records. Scores are clamped and rounded here, and all
//! text comes from the `text` table.

use crate::detectors::{Finding, Outcome};
use crate::text;
use crate::types::{Condition, RiskAssessment, Severity};
use crate::window::TimeWindow;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Round to three decimals after clamping into [0, 1]
pub fn finalize_unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    (value.clamp(0.0, 1.0) * 1000.0).round() / 1000.0
}

/// Encoder producing assessments from findings
#[derive(Debug, Default, Clone, Copy)]
pub struct AssessmentEncoder;

impl AssessmentEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Encode a finding with an explicit creation time
    pub fn encode_at(
        &self,
        finding: &Finding,
        window: TimeWindow,
        created_at: NaiveDateTime,
    ) -> RiskAssessment {
        let (summary, recommendation) = match &finding.outcome {
            Outcome::SleepApnea { evidence } => (
                text::sleep_apnea_summary(evidence),
                text::recommendation(finding.condition).to_string(),
            ),
            Outcome::Tachycardia { episodes } => (
                text::tachycardia_summary(*episodes),
                text::recommendation(finding.condition).to_string(),
            ),
            Outcome::IllnessOnset {
                hr_increase,
                hrv_change_pct,
            } => (
                text::illness_onset_summary(*hr_increase, *hrv_change_pct),
                text::recommendation(finding.condition).to_string(),
            ),
            Outcome::InsufficientData { reason } => {
                let (summary, recommendation) = text::insufficient(finding.condition, *reason);
                (summary.to_string(), recommendation.to_string())
            }
        };

        RiskAssessment {
            condition: finding.condition,
            window,
            score: finalize_unit(finding.score),
            confidence: finalize_unit(finding.confidence),
            severity: finding.severity,
            interpretation: text::interpretation(finding.interpretation).to_string(),
            summary,
            recommendation,
            clinical_safety_note: text::CLINICAL_SAFETY_NOTE.to_string(),
            created_at,
        }
    }

    /// Build the serialized report record for an assessment
    pub fn view(&self, assessment: &RiskAssessment) -> AssessmentView {
        let label = text::condition_label(assessment.condition);
        let final_message = format!(
            "{label}. Уровень риска: {:.2}, достоверность сигнала: {:.2}. {} {}",
            assessment.score,
            assessment.confidence,
            assessment.interpretation,
            assessment.recommendation
        );

        AssessmentView {
            condition: assessment.condition,
            condition_label: label.to_string(),
            window: assessment.window,
            score: assessment.score,
            confidence: assessment.confidence,
            risk_level: assessment.score,
            signal_confidence: assessment.confidence,
            severity: assessment.severity,
            interpretation: assessment.interpretation.clone(),
            summary: assessment.summary.clone(),
            recommendation: assessment.recommendation.clone(),
            final_message,
            clinical_safety_note: assessment.clinical_safety_note.clone(),
            created_at: assessment.created_at.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
        }
    }
}

/// Serialized form of an assessment, with the Russian field aliases reports use
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentView {
    pub condition: Condition,
    #[serde(rename = "подозреваемое_состояние")]
    pub condition_label: String,
    pub window: TimeWindow,
    pub score: f64,
    pub confidence: f64,
    #[serde(rename = "уровень_риска")]
    pub risk_level: f64,
    #[serde(rename = "достоверность_сигнала")]
    pub signal_confidence: f64,
    pub severity: Severity,
    pub interpretation: String,
    pub summary: String,
    pub recommendation: String,
    #[serde(rename = "итоговое_сообщение")]
    pub final_message: String,
    pub clinical_safety_note: String,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::{InsufficientReason, Outcome};
    use crate::interpretation::Interpretation;
    use crate::types::SignalEvidence;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn created() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, 26)
            .unwrap()
            .and_hms_opt(2, 0, 0)
            .unwrap()
    }

    fn apnea_finding() -> Finding {
        Finding {
            condition: Condition::SleepApnea,
            score: 0.66666,
            confidence: 0.70049,
            severity: Severity::Medium,
            interpretation: Interpretation::HighRiskHighConfidence,
            outcome: Outcome::SleepApnea {
                evidence: SignalEvidence {
                    low_respiratory_events: 3,
                    hr_spike_events: 2,
                    hrv_drop_events: 1,
                    data_points: 60,
                },
            },
        }
    }

    #[test]
    fn test_finalize_unit() {
        assert_eq!(finalize_unit(0.12345), 0.123);
        assert_eq!(finalize_unit(1.7), 1.0);
        assert_eq!(finalize_unit(-0.2), 0.0);
        assert_eq!(finalize_unit(f64::NAN), 0.0);
    }

    #[test]
    fn test_encode_rounds_and_renders_text() {
        let encoder = AssessmentEncoder::new();
        let assessment = encoder.encode_at(&apnea_finding(), TimeWindow::Night, created());

        assert_eq!(assessment.score, 0.667);
        assert_eq!(assessment.confidence, 0.7);
        assert_eq!(assessment.window, TimeWindow::Night);
        assert_eq!(assessment.created_at, created());
        assert!(assessment.summary.contains("пониженной частоты дыхания: 3"));
        assert!(assessment.summary.contains("всплеском пульса: 2"));
        assert_eq!(
            assessment.interpretation,
            text::interpretation(Interpretation::HighRiskHighConfidence)
        );
        assert_eq!(assessment.clinical_safety_note, text::CLINICAL_SAFETY_NOTE);
    }

    #[test]
    fn test_encode_insufficient_sentinel() {
        let encoder = AssessmentEncoder::new();
        let finding = Finding {
            condition: Condition::IllnessOnset,
            score: 0.0,
            confidence: 0.0,
            severity: Severity::Unknown,
            interpretation: Interpretation::InsufficientData,
            outcome: Outcome::InsufficientData {
                reason: InsufficientReason::UnstableBaseline,
            },
        };

        let assessment = encoder.encode_at(&finding, TimeWindow::Week, created());

        assert_eq!(assessment.severity, Severity::Unknown);
        assert_eq!(
            assessment.summary,
            "Не удалось устойчиво посчитать тренды пульса в покое и HRV."
        );
    }

    #[test]
    fn test_view_fields() {
        let encoder = AssessmentEncoder::new();
        let assessment = encoder.encode_at(&apnea_finding(), TimeWindow::Night, created());
        let json = serde_json::to_value(encoder.view(&assessment)).unwrap();

        assert_eq!(json["condition"], "sleep_apnea_risk");
        assert_eq!(json["подозреваемое_состояние"], "Подозрение на апноэ сна");
        assert_eq!(json["window"], "night");
        assert_eq!(json["уровень_риска"], 0.667);
        assert_eq!(json["достоверность_сигнала"], 0.7);
        assert_eq!(json["severity"], "medium");
        assert_eq!(json["created_at"], "2026-02-26T02:00:00");

        let message = json["итоговое_сообщение"].as_str().unwrap();
        assert!(message.starts_with("Подозрение на апноэ сна. Уровень риска: 0.67, достоверность сигнала: 0.70."));
        assert!(message.ends_with(&assessment.recommendation));
    }
}
