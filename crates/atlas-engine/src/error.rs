//! Errors returned by [`crate::TransitionEngine::transition`].
//!
//! Every variant except `Store` is raised before anything is written, so
//! the event and its history are untouched when the caller sees it.

use thiserror::Error;

use atlas_core::EventId;
use atlas_state::{EventState, RequirementViolation};

use crate::store::StoreError;

/// A transition request that could not be committed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// The id does not resolve to an event.
    #[error("event {0} not found")]
    EventNotFound(EventId),

    /// The target is not an outgoing edge of the current state. Forcing
    /// does not bypass this.
    #[error("invalid transition for event {event_id}: {from} -> {to}{}", forced_suffix(.forced))]
    InvalidTransition {
        event_id: EventId,
        from: EventState,
        to: EventState,
        forced: bool,
    },

    /// The target's entry requirements are not met.
    #[error("requirements for {target} not met on event {event_id}: {}", join_violations(.violations))]
    RequirementsNotMet {
        event_id: EventId,
        target: EventState,
        /// Every violation found, missing fields first.
        violations: Vec<RequirementViolation>,
    },

    /// The caller expected the event in a different state.
    #[error("event {event_id} is in {actual}, expected {expected}")]
    StateChanged {
        event_id: EventId,
        expected: EventState,
        actual: EventState,
    },

    /// Persistence failed, or version conflicts outlasted the retry bound.
    #[error(transparent)]
    Store(#[from] StoreError),
}

fn forced_suffix(forced: &bool) -> &'static str {
    if *forced {
        " (forced)"
    } else {
        ""
    }
}

fn join_violations(violations: &[RequirementViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl TransitionError {
    /// Short machine-readable category, used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EventNotFound(_) => "event_not_found",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::RequirementsNotMet { .. } => "requirements_not_met",
            Self::StateChanged { .. } => "state_changed",
            Self::Store(_) => "store",
        }
    }

    /// Whether a scheduled scan should treat this as a skip rather than a
    /// failure: the event moved on between the scan and the transition.
    pub fn is_benign_for_scan(&self) -> bool {
        matches!(
            self,
            Self::InvalidTransition { .. } | Self::StateChanged { .. }
        )
    }
}
