//! # Event Store
//!
//! The persistence contract the engine commits through, and an in-memory
//! implementation.
//!
//! `save` is a compare-and-swap on the event's `version`: it succeeds only
//! when the stored version equals the version the caller loaded. The engine
//! uses this, on top of its per-event lock, so that a second engine
//! instance or an out-of-band writer cannot interleave with a commit.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

use atlas_core::EventId;
use atlas_state::{Event, EventState};

/// Errors returned by an [`EventStore`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No event with this id.
    #[error("event {0} not found")]
    NotFound(EventId),

    /// The stored version moved since the caller loaded the event.
    #[error("version conflict on event {event_id}: expected {expected}, found {actual}")]
    VersionConflict {
        /// The contested event.
        event_id: EventId,
        /// Version the caller loaded.
        expected: u64,
        /// Version currently stored.
        actual: u64,
    },

    /// An insert collided with an existing event.
    #[error("event {0} already exists")]
    AlreadyExists(EventId),

    /// The backing store failed.
    #[error("event store backend error: {0}")]
    Backend(String),
}

/// Persistence used by the transition engine.
pub trait EventStore: Send + Sync {
    /// Load the current record.
    fn load(&self, id: &EventId) -> impl Future<Output = Result<Event, StoreError>> + Send;

    /// Replace the stored record if its version still equals
    /// `expected_version`.
    fn save(
        &self,
        event: Event,
        expected_version: u64,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Every event currently in one of `states`.
    fn list_in_states(
        &self,
        states: &[EventState],
    ) -> impl Future<Output = Result<Vec<Event>, StoreError>> + Send;
}

// ─── In-memory store ─────────────────────────────────────────────────

/// Thread-safe, cloneable in-memory event store.
///
/// Clones share the same map. The lock is never held across an `.await`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventStore {
    events: Arc<RwLock<HashMap<EventId, Event>>>,
}

impl InMemoryEventStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new event.
    pub fn insert(&self, event: Event) -> Result<(), StoreError> {
        let mut guard = self.events.write();
        if guard.contains_key(&event.id) {
            return Err(StoreError::AlreadyExists(event.id));
        }
        guard.insert(event.id.clone(), event);
        Ok(())
    }

    /// Snapshot of one event.
    pub fn get(&self, id: &EventId) -> Option<Event> {
        self.events.read().get(id).cloned()
    }

    /// Snapshot of every event, ordered by id.
    pub fn snapshot(&self) -> Vec<Event> {
        let mut events: Vec<Event> = self.events.read().values().cloned().collect();
        events.sort_by(|a, b| a.id.cmp(&b.id));
        events
    }

    /// Number of stored events.
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}

impl EventStore for InMemoryEventStore {
    async fn load(&self, id: &EventId) -> Result<Event, StoreError> {
        self.get(id).ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn save(&self, event: Event, expected_version: u64) -> Result<(), StoreError> {
        let mut guard = self.events.write();
        let Some(current) = guard.get_mut(&event.id) else {
            return Err(StoreError::NotFound(event.id));
        };
        if current.version != expected_version {
            return Err(StoreError::VersionConflict {
                event_id: event.id,
                expected: expected_version,
                actual: current.version,
            });
        }
        *current = event;
        Ok(())
    }

    async fn list_in_states(&self, states: &[EventState]) -> Result<Vec<Event>, StoreError> {
        Ok(self
            .snapshot()
            .into_iter()
            .filter(|event| states.contains(&event.status))
            .collect())
    }
}
