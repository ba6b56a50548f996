//! Sample sources and event stores
//!
//! The engine reads rows from a [`SampleSource`] and hands extracted apnea
//! events to an [`EventStore`]. Both are collaborator seams; in-memory
//! implementations are provided for the CLI and tests.

use crate::error::RiskError;
use crate::types::{ApneaEvent, EventKey, RawRow, SignalKind};
use chrono::NaiveDateTime;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};

/// Supplier of raw rows for a signal kind and time range
pub trait SampleSource {
    /// Rows with `start <= timestamp <= end`, ordered by timestamp
    fn fetch(
        &self,
        kind: SignalKind,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<RawRow>, RiskError>;
}

/// Idempotent sink for apnea events
pub trait EventStore {
    /// Insert events, skipping keys already present; returns rows inserted
    fn insert_events(&mut self, events: &[ApneaEvent]) -> Result<usize, RiskError>;
}

/// Rows held in memory, grouped by signal kind
#[derive(Debug, Clone, Default)]
pub struct MemorySampleStore {
    rows: HashMap<SignalKind, Vec<RawRow>>,
}

impl MemorySampleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: SignalKind, row: RawRow) {
        self.rows.entry(kind).or_default().push(row);
    }

    pub fn extend<I>(&mut self, kind: SignalKind, rows: I)
    where
        I: IntoIterator<Item = RawRow>,
    {
        self.rows.entry(kind).or_default().extend(rows);
    }

    /// All rows of a kind in insertion order
    pub fn rows(&self, kind: SignalKind) -> &[RawRow] {
        self.rows.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.rows.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SampleSource for MemorySampleStore {
    fn fetch(
        &self,
        kind: SignalKind,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<RawRow>, RiskError> {
        let mut rows: Vec<RawRow> = self
            .rows(kind)
            .iter()
            .filter(|row| row.timestamp.is_some_and(|ts| start <= ts && ts <= end))
            .cloned()
            .collect();
        // stable, so rows sharing a timestamp keep their insertion order
        rows.sort_by_key(|row| row.timestamp);
        Ok(rows)
    }
}

/// Event store keyed by `(start_time, end_time, detected_by)`
#[derive(Debug, Clone, Default)]
pub struct MemoryEventStore {
    events: BTreeMap<EventKey, ApneaEvent>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored events in key order
    pub fn events(&self) -> impl Iterator<Item = &ApneaEvent> {
        self.events.values()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventStore for MemoryEventStore {
    fn insert_events(&mut self, events: &[ApneaEvent]) -> Result<usize, RiskError> {
        let mut inserted = 0;
        for event in events {
            if let Entry::Vacant(slot) = self.events.entry(event.key()) {
                slot.insert(event.clone());
                inserted += 1;
            }
        }
        Ok(inserted)
    }
}
