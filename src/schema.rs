//! Input record format
//!
//! Samples arrive as one JSON object per row:
//!
//! ```json
//! {"kind": "heart_rate", "timestamp": "2026-02-26T01:00:00", "value": "72,5"}
//! ```
//!
//! `timestamp` and `value` may be missing or null; such rows are kept here and
//! dropped later by normalization.

use crate::error::RiskError;
use crate::normalizer::parse_value;
use crate::store::MemorySampleStore;
use crate::types::{RawRow, RawValue, SignalKind};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One input row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    pub kind: SignalKind,
    #[serde(default)]
    pub timestamp: Option<NaiveDateTime>,
    #[serde(default)]
    pub value: Option<RawValue>,
}

impl SampleRecord {
    pub fn into_row(self) -> (SignalKind, RawRow) {
        (
            self.kind,
            RawRow {
                timestamp: self.timestamp,
                value: self.value,
            },
        )
    }

    /// Whether normalization would keep this row
    pub fn is_usable(&self) -> bool {
        self.timestamp.is_some() && self.value.as_ref().and_then(parse_value).is_some()
    }
}

/// Per-kind row counts for an input batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindStats {
    pub total: usize,
    pub usable: usize,
    pub dropped: usize,
}

/// Parser for sample records
pub struct RecordReader;

impl RecordReader {
    /// Parse a JSON array of records
    pub fn parse_array(json: &str) -> Result<Vec<SampleRecord>, RiskError> {
        let records: Vec<SampleRecord> = serde_json::from_str(json)?;
        Ok(records)
    }

    /// Parse NDJSON (one record per line, blank lines ignored)
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<SampleRecord>, RiskError> {
        let mut records = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let record = serde_json::from_str::<SampleRecord>(trimmed).map_err(|e| {
                RiskError::ParseError(format!("Failed to parse line {}: {}", line_num + 1, e))
            })?;
            records.push(record);
        }
        Ok(records)
    }

    /// Group records into an in-memory sample store
    pub fn into_store(records: Vec<SampleRecord>) -> MemorySampleStore {
        let mut store = MemorySampleStore::new();
        for record in records {
            let (kind, row) = record.into_row();
            store.push(kind, row);
        }
        store
    }

    /// Count usable and dropped rows per signal kind
    pub fn stats(records: &[SampleRecord]) -> BTreeMap<SignalKind, KindStats> {
        let mut stats: BTreeMap<SignalKind, KindStats> = BTreeMap::new();
        for record in records {
            let entry = stats.entry(record.kind).or_default();
            entry.total += 1;
            if record.is_usable() {
                entry.usable += 1;
            } else {
                entry.dropped += 1;
            }
        }
        stats
    }
}
