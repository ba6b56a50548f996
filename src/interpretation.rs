//! Score/confidence interpretation

use serde::{Deserialize, Serialize};

/// Qualitative reading of a `(score, confidence)` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpretation {
    HighRiskLowConfidence,
    HighRiskHighConfidence,
    LowRisk,
    MonitorTrend,
    /// Set by detectors that could not score at all
    InsufficientData,
}

/// Interpret a score against its confidence
pub fn interpret(score: f64, confidence: f64) -> Interpretation {
    let high_risk = score >= 0.6;
    let confident = confidence >= 0.5;

    if high_risk && !confident {
        Interpretation::HighRiskLowConfidence
    } else if high_risk {
        Interpretation::HighRiskHighConfidence
    } else if score < 0.3 && confident {
        Interpretation::LowRisk
    } else {
        Interpretation::MonitorTrend
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpretation_quadrants() {
        assert_eq!(interpret(0.6, 0.49), Interpretation::HighRiskLowConfidence);
        assert_eq!(interpret(0.9, 0.5), Interpretation::HighRiskHighConfidence);
        assert_eq!(interpret(0.29, 0.5), Interpretation::LowRisk);
        assert_eq!(interpret(0.45, 0.9), Interpretation::MonitorTrend);
        assert_eq!(interpret(0.1, 0.2), Interpretation::MonitorTrend);
    }
}
