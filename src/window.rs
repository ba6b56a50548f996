//! Analysis windows
//!
//! A window is a fixed lookback anchored at the evaluation instant.

use crate::error::RiskError;
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lookback window for an evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    Night,
    Week,
    Month,
}

impl TimeWindow {
    /// Every window, in evaluation order
    pub const ALL: [TimeWindow; 3] = [TimeWindow::Night, TimeWindow::Week, TimeWindow::Month];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::Night => "night",
            TimeWindow::Week => "week",
            TimeWindow::Month => "month",
        }
    }

    pub fn lookback(&self) -> Duration {
        match self {
            TimeWindow::Night => Duration::hours(12),
            TimeWindow::Week => Duration::days(7),
            TimeWindow::Month => Duration::days(30),
        }
    }

    /// `(start, end)` of this window ending at `now`
    pub fn resolve(&self, now: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
        (now - self.lookback(), now)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeWindow {
    type Err = RiskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "night" => Ok(TimeWindow::Night),
            "week" => Ok(TimeWindow::Week),
            "month" => Ok(TimeWindow::Month),
            other => Err(RiskError::InvalidWindow(other.to_string())),
        }
    }
}
