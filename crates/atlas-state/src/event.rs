//! # Event Record and Transition History
//!
//! The event record belongs to the host application. The lifecycle engine
//! reads arbitrary fields from it (for guards and automatic rules) and
//! writes exactly three: `status`, `stateHistory` and `version`.
//!
//! ## Committing a transition
//!
//! State changes are applied as a pure transform, [`Event::apply`], which
//! consumes the record and a [`StateUpdate`] and returns the next record.
//! The engine never mutates a record it has already handed to the store.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use atlas_core::{EventId, Timestamp};

use crate::state::EventState;

// ─── Transition Record ───────────────────────────────────────────────

/// Record of one committed state change.
///
/// Appended to the event's history on every commit, manual or automatic,
/// and never mutated or removed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRecord {
    /// State before the transition.
    pub from_state: EventState,
    /// State after the transition.
    pub to_state: EventState,
    /// Who requested it (`"system"` for automatic links).
    pub actor: String,
    /// When the transition was committed.
    pub timestamp: Timestamp,
    /// Free-text reason supplied by the caller or the rule that fired.
    #[serde(default)]
    pub reason: Option<String>,
    /// Whether requirement checks were skipped.
    #[serde(default)]
    pub forced: bool,
}

/// A committed state change waiting to be applied to an event record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateUpdate {
    record: TransitionRecord,
}

impl StateUpdate {
    /// Wrap the history record that describes the change.
    pub fn new(record: TransitionRecord) -> Self {
        Self { record }
    }
}

// ─── Event ───────────────────────────────────────────────────────────

/// An event record as seen by the lifecycle engine.
///
/// Business fields (title, venue, registration settings, …) are kept as an
/// open JSON map and addressed by dotted paths such as
/// `registrationSettings.deadline`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Host-assigned identifier.
    pub id: EventId,
    /// Current lifecycle state.
    pub status: EventState,
    /// Append-only log of committed transitions, oldest first.
    #[serde(default)]
    pub state_history: Vec<TransitionRecord>,
    /// Optimistic-concurrency version, bumped on every commit.
    #[serde(default)]
    pub version: u64,
    /// Every other field of the host's record.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Event {
    /// A freshly created event in `draft` with no history.
    pub fn new(id: EventId) -> Self {
        Self {
            id,
            status: EventState::Draft,
            state_history: Vec::new(),
            version: 0,
            fields: Map::new(),
        }
    }

    /// Builder-style [`Event::set_field`].
    pub fn with_field(mut self, path: &str, value: impl Into<Value>) -> Self {
        self.set_field(path, value);
        self
    }

    /// Set the value at a dotted path, creating intermediate objects.
    ///
    /// A non-object value sitting on the path is replaced by an object.
    pub fn set_field(&mut self, path: &str, value: impl Into<Value>) {
        let mut segments: Vec<&str> = path.split('.').collect();
        let Some(last) = segments.pop() else {
            return;
        };
        let mut cursor = &mut self.fields;
        for segment in segments {
            let slot = cursor
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            cursor = match slot {
                Value::Object(map) => map,
                _ => return,
            };
        }
        cursor.insert(last.to_string(), value.into());
    }

    /// Resolve a dotted path.
    ///
    /// Returns `None` when any segment is absent or `null`, or when a
    /// segment walks into a scalar. Numeric segments index into arrays.
    pub fn field(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.fields.get(first)?;
        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        if current.is_null() {
            None
        } else {
            Some(current)
        }
    }

    /// Resolve a dotted path to an instant.
    ///
    /// Accepts RFC 3339 strings (any offset) and `YYYY-MM-DD` dates.
    /// Anything else, including a missing field, yields `None`.
    pub fn instant(&self, path: &str) -> Option<Timestamp> {
        self.field(path)?
            .as_str()
            .and_then(|s| Timestamp::parse_date_or_datetime(s).ok())
    }

    /// Apply a committed state change, returning the next record.
    pub fn apply(mut self, update: StateUpdate) -> Event {
        self.status = update.record.to_state;
        self.state_history.push(update.record);
        self.version += 1;
        self
    }

    /// The most recent transition, if any.
    pub fn last_transition(&self) -> Option<&TransitionRecord> {
        self.state_history.last()
    }

    /// When the event entered its current state, if that entry was recorded.
    pub fn entered_current_state_at(&self) -> Option<Timestamp> {
        self.state_history
            .iter()
            .rev()
            .find(|record| record.to_state == self.status)
            .map(|record| record.timestamp)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
