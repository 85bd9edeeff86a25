//! Event sinks.
//!
//! A subsystem emits while still holding its own write lock and before it
//! commits the mutation, so a sink failure aborts the call cleanly.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use tessera_types::{EventRecord, LedgerError, LedgerEvent};
use tracing::info;

/// Receives every committed ledger event, exactly once per successful call.
pub trait EventSink: Send + Sync {
    fn emit(
        &self,
        emitted_at: DateTime<Utc>,
        event: LedgerEvent,
    ) -> Result<EventRecord, LedgerError>;
}

impl<S: EventSink + ?Sized> EventSink for Arc<S> {
    fn emit(
        &self,
        emitted_at: DateTime<Utc>,
        event: LedgerEvent,
    ) -> Result<EventRecord, LedgerError> {
        (**self).emit(emitted_at, event)
    }
}

/// Ordered in-memory event log.
pub struct MemoryEventLog {
    records: RwLock<Vec<EventRecord>>,
}

impl MemoryEventLog {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    /// All committed events in emission order.
    pub fn records(&self) -> Result<Vec<EventRecord>, LedgerError> {
        let records = self
            .records
            .read()
            .map_err(|_| LedgerError::LockPoisoned("event log"))?;
        Ok(records.clone())
    }

    /// Events with a sequence number greater than `sequence`.
    pub fn since(&self, sequence: u64) -> Result<Vec<EventRecord>, LedgerError> {
        let records = self
            .records
            .read()
            .map_err(|_| LedgerError::LockPoisoned("event log"))?;
        Ok(records
            .iter()
            .filter(|record| record.sequence > sequence)
            .cloned()
            .collect())
    }

    pub fn len(&self) -> Result<usize, LedgerError> {
        let records = self
            .records
            .read()
            .map_err(|_| LedgerError::LockPoisoned("event log"))?;
        Ok(records.len())
    }

    pub fn is_empty(&self) -> Result<bool, LedgerError> {
        Ok(self.len()? == 0)
    }
}

impl Default for MemoryEventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for MemoryEventLog {
    fn emit(
        &self,
        emitted_at: DateTime<Utc>,
        event: LedgerEvent,
    ) -> Result<EventRecord, LedgerError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| LedgerError::LockPoisoned("event log"))?;

        let record = EventRecord::new(records.len() as u64 + 1, emitted_at, event);
        info!(
            event = record.name(),
            sequence = record.sequence,
            event_id = %record.event_id,
            "Event committed"
        );
        records.push(record.clone());
        Ok(record)
    }
}

/// Forwards events to the tracing subscriber instead of retaining them.
#[derive(Default)]
pub struct TracingEventSink {
    sequence: AtomicU64,
}

impl TracingEventSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for TracingEventSink {
    fn emit(
        &self,
        emitted_at: DateTime<Utc>,
        event: LedgerEvent,
    ) -> Result<EventRecord, LedgerError> {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let record = EventRecord::new(sequence, emitted_at, event);
        info!(
            event = record.name(),
            sequence,
            event_id = %record.event_id,
            payload = ?record.event,
            "Event committed"
        );
        Ok(record)
    }
}
