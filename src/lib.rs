//! Synheart Risk - rule-based health risk scoring for wearable time series
//!
//! Risk turns heart rate, respiratory rate and HRV series into bounded risk
//! scores through a deterministic pipeline: sample source → normalization →
//! detectors → assessment encoding.
//!
//! ## Conditions
//!
//! - **Sleep apnea**: respiratory depressions correlated with heart rate
//!   spikes and HRV drops, plus extraction of individual episodes
//! - **Tachycardia**: frequency of elevated heart rate samples
//! - **Illness onset**: resting heart rate and HRV trend divergence
//!
//! The scores are heuristics, not a diagnosis. Every assessment carries a
//! clinical safety note saying so.

pub mod config;
pub mod detectors;
pub mod encoder;
pub mod error;
pub mod interpretation;
pub mod normalizer;
pub mod pipeline;
pub mod schema;
pub mod series;
pub mod store;
pub mod text;
pub mod types;
pub mod window;

pub use config::EngineConfig;
pub use detectors::{Finding, Outcome};
pub use encoder::{AssessmentEncoder, AssessmentView};
pub use error::RiskError;
pub use pipeline::{RiskEngine, WindowReport};
pub use store::{EventStore, MemoryEventStore, MemorySampleStore, SampleSource};
pub use types::{ApneaEvent, Condition, RiskAssessment, Sample, Severity, SignalKind};
pub use window::TimeWindow;

/// Engine version embedded in reports
pub const RISK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "synheart-risk";
