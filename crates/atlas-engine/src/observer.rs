//! # Transition Observers
//!
//! Typed callbacks for committed transitions and for failed attempts.
//! Registration is by closure. Transition callbacks run synchronously on the
//! task that performed the commit, after its actions were dispatched; error
//! callbacks run on the task whose attempt was rejected.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use atlas_core::{EventId, Timestamp};
use atlas_state::EventState;

use crate::dispatcher::ActionOutcome;

/// Emitted after every committed transition, manual or automatic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateTransitionNotice {
    pub event_id: EventId,
    pub from_state: EventState,
    pub to_state: EventState,
    pub actor: String,
    pub timestamp: Timestamp,
    pub forced: bool,
    /// Whether the link was produced by an automatic rule.
    pub automatic: bool,
    /// Outcome of each state-entry action, in dispatch order.
    pub actions: Vec<ActionOutcome>,
}

/// Emitted for every failed transition attempt, manual or automatic.
///
/// A failed automatic follow-up leaves the link that triggered it
/// committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionErrorNotice {
    pub event_id: EventId,
    /// State the event was in, when it could be loaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_state: Option<EventState>,
    /// Requested target state.
    pub to_state: EventState,
    /// Whether the attempt came from an automatic rule.
    pub automatic: bool,
    /// Short error category, see [`crate::TransitionError::kind`].
    pub kind: String,
    pub message: String,
}

type TransitionCallback = Arc<dyn Fn(&StateTransitionNotice) + Send + Sync>;
type ErrorCallback = Arc<dyn Fn(&TransitionErrorNotice) + Send + Sync>;

/// Registered observer callbacks.
#[derive(Default)]
pub struct Observers {
    transitions: RwLock<Vec<TransitionCallback>>,
    errors: RwLock<Vec<ErrorCallback>>,
}

impl Observers {
    /// No observers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `callback` after every committed transition.
    pub fn on_transition(&self, callback: impl Fn(&StateTransitionNotice) + Send + Sync + 'static) {
        self.transitions.write().push(Arc::new(callback));
    }

    /// Call `callback` whenever a transition attempt fails.
    pub fn on_transition_error(
        &self,
        callback: impl Fn(&TransitionErrorNotice) + Send + Sync + 'static,
    ) {
        self.errors.write().push(Arc::new(callback));
    }

    /// Deliver a transition notice to every observer, in registration order.
    pub fn notify_transition(&self, notice: &StateTransitionNotice) {
        let callbacks = self.transitions.read().clone();
        for callback in callbacks {
            callback(notice);
        }
    }

    /// Deliver an error notice to every observer, in registration order.
    pub fn notify_transition_error(&self, notice: &TransitionErrorNotice) {
        let callbacks = self.errors.read().clone();
        for callback in callbacks {
            callback(notice);
        }
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("transitions", &self.transitions.read().len())
            .field("errors", &self.errors.read().len())
            .finish()
    }
}
