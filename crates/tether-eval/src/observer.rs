//! Observers notified after each successful mutation.

use std::sync::Mutex;

use tether_types::Record;
use tracing::info;

/// Receives a notification after each mutation the evaluator performs.
///
/// Calls are synchronous and happen only after the store reported success.
pub trait SyncObserver: Send + Sync {
    /// A serialized record with no live counterpart was materialized.
    fn on_created(&self, record: &Record);

    /// A live record was overwritten from its serialized counterpart.
    fn on_updated(&self, serialized: &Record, materialized: &Record);

    /// A live record with no serialized counterpart was removed.
    fn on_recycled(&self, _record: &Record) {}
}

/// Ignores every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullObserver;

impl SyncObserver for NullObserver {
    fn on_created(&self, _record: &Record) {}

    fn on_updated(&self, _serialized: &Record, _materialized: &Record) {}
}

/// Emits one structured `tracing` event per notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl SyncObserver for TracingObserver {
    fn on_created(&self, record: &Record) {
        info!(id = %record.id, name = %record.name, "[A] added record from serialized store");
    }

    fn on_updated(&self, serialized: &Record, materialized: &Record) {
        info!(
            id = %materialized.id,
            name = %materialized.name,
            versions = serialized.version_count(),
            "[U] updated record from serialized store"
        );
    }

    fn on_recycled(&self, record: &Record) {
        info!(id = %record.id, name = %record.name, "[D] recycled orphaned record");
    }
}

/// A notification captured by [`RecordingObserver`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncEvent {
    Created(Record),
    Updated {
        serialized: Record,
        materialized: Record,
    },
    Recycled(Record),
}

/// Keeps every notification in arrival order.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<SyncEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of all events seen so far.
    pub fn events(&self) -> Vec<SyncEvent> {
        self.events.lock().expect("lock poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&self, event: SyncEvent) {
        self.events.lock().expect("lock poisoned").push(event);
    }
}

impl SyncObserver for RecordingObserver {
    fn on_created(&self, record: &Record) {
        self.push(SyncEvent::Created(record.clone()));
    }

    fn on_updated(&self, serialized: &Record, materialized: &Record) {
        self.push(SyncEvent::Updated {
            serialized: serialized.clone(),
            materialized: materialized.clone(),
        });
    }

    fn on_recycled(&self, record: &Record) {
        self.push(SyncEvent::Recycled(record.clone()));
    }
}
