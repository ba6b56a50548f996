//! Error types for Synheart Risk
//!
//! Scoring itself never fails. These errors come from the edges: parsing
//! input records, loading configuration, and talking to sample sources or
//! event stores.

use thiserror::Error;

/// Errors that can occur around a risk computation
#[derive(Debug, Error)]
pub enum RiskError {
    #[error("Failed to parse input: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid window: {0}")]
    InvalidWindow(String),

    #[error("Date parse error: {0}")]
    DateParseError(String),

    #[error("Sample source error: {0}")]
    SourceError(String),

    #[error("Event store error: {0}")]
    StoreError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}
