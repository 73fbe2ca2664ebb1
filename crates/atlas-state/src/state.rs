//! # Event Lifecycle States
//!
//! The fixed enumeration of operational phases an event moves through.
//!
//! ```text
//! planning      draft ─▶ planning ─▶ approved
//! registration  registration_open ─▶ registration_closing ─▶ registration_closed
//! abstracts     abstract_submission_open ─▶ …_closing ─▶ …_closed
//!                 ─▶ review_in_progress ─▶ review_completed
//! pre-event     schedule_published ─▶ ready_to_start
//! execution     in_progress ⇄ paused, in_progress ─▶ completed ─▶ closed
//! special       cancelled, postponed, archived (terminal)
//! ```
//!
//! States are a closed Rust enum rather than free-form strings; the host's
//! string names only exist at the serialization boundary, where an unknown
//! name is rejected with [`StateError::UnknownState`].

use serde::{Deserialize, Serialize};

use crate::error::StateError;

/// Lifecycle phase a state belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Event is being set up.
    Planning,
    /// Attendee registration window.
    Registration,
    /// Abstract call and peer review.
    Abstracts,
    /// Programme is fixed, event not yet running.
    PreEvent,
    /// Event is running or wrapping up.
    Execution,
    /// Side or terminal states reachable from many phases.
    Special,
}

/// The lifecycle state of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventState {
    Draft,
    Planning,
    Approved,
    RegistrationOpen,
    RegistrationClosing,
    RegistrationClosed,
    AbstractSubmissionOpen,
    AbstractSubmissionClosing,
    AbstractSubmissionClosed,
    ReviewInProgress,
    ReviewCompleted,
    SchedulePublished,
    ReadyToStart,
    InProgress,
    Paused,
    Completed,
    Closed,
    Cancelled,
    Postponed,
    /// No outgoing transitions.
    Archived,
}

impl EventState {
    /// Every state, in lifecycle order.
    pub const ALL: [EventState; 20] = [
        Self::Draft,
        Self::Planning,
        Self::Approved,
        Self::RegistrationOpen,
        Self::RegistrationClosing,
        Self::RegistrationClosed,
        Self::AbstractSubmissionOpen,
        Self::AbstractSubmissionClosing,
        Self::AbstractSubmissionClosed,
        Self::ReviewInProgress,
        Self::ReviewCompleted,
        Self::SchedulePublished,
        Self::ReadyToStart,
        Self::InProgress,
        Self::Paused,
        Self::Completed,
        Self::Closed,
        Self::Cancelled,
        Self::Postponed,
        Self::Archived,
    ];

    /// The wire name (e.g. `"registration_open"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Planning => "planning",
            Self::Approved => "approved",
            Self::RegistrationOpen => "registration_open",
            Self::RegistrationClosing => "registration_closing",
            Self::RegistrationClosed => "registration_closed",
            Self::AbstractSubmissionOpen => "abstract_submission_open",
            Self::AbstractSubmissionClosing => "abstract_submission_closing",
            Self::AbstractSubmissionClosed => "abstract_submission_closed",
            Self::ReviewInProgress => "review_in_progress",
            Self::ReviewCompleted => "review_completed",
            Self::SchedulePublished => "schedule_published",
            Self::ReadyToStart => "ready_to_start",
            Self::InProgress => "in_progress",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Closed => "closed",
            Self::Cancelled => "cancelled",
            Self::Postponed => "postponed",
            Self::Archived => "archived",
        }
    }

    /// The phase this state belongs to.
    pub fn phase(&self) -> Phase {
        match self {
            Self::Draft | Self::Planning | Self::Approved => Phase::Planning,
            Self::RegistrationOpen | Self::RegistrationClosing | Self::RegistrationClosed => {
                Phase::Registration
            }
            Self::AbstractSubmissionOpen
            | Self::AbstractSubmissionClosing
            | Self::AbstractSubmissionClosed
            | Self::ReviewInProgress
            | Self::ReviewCompleted => Phase::Abstracts,
            Self::SchedulePublished | Self::ReadyToStart => Phase::PreEvent,
            Self::InProgress | Self::Paused | Self::Completed | Self::Closed => Phase::Execution,
            Self::Cancelled | Self::Postponed | Self::Archived => Phase::Special,
        }
    }

    /// Whether this state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Archived)
    }
}

impl std::fmt::Display for EventState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EventState {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| StateError::UnknownState(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_roundtrip_through_from_str() {
        for state in EventState::ALL {
            let parsed: EventState = state.as_str().parse().unwrap();
            assert_eq!(parsed, state);
        }
    }

    #[test]
    fn test_serde_uses_wire_names() {
        for state in EventState::ALL {
            let json = serde_json::to_string(&state).unwrap();
            assert_eq!(json, format!("\"{}\"", state.as_str()));
        }
    }

    #[test]
    fn test_unknown_name_rejected() {
        let err = "live".parse::<EventState>().unwrap_err();
        assert!(matches!(err, StateError::UnknownState(ref s) if s == "live"));
        assert!("Draft".parse::<EventState>().is_err());
    }

    #[test]
    fn test_only_archived_is_terminal() {
        let terminal: Vec<_> = EventState::ALL.iter().filter(|s| s.is_terminal()).collect();
        assert_eq!(terminal, vec![&EventState::Archived]);
    }

    #[test]
    fn test_phases() {
        assert_eq!(EventState::Approved.phase(), Phase::Planning);
        assert_eq!(EventState::RegistrationClosing.phase(), Phase::Registration);
        assert_eq!(EventState::ReviewCompleted.phase(), Phase::Abstracts);
        assert_eq!(EventState::ReadyToStart.phase(), Phase::PreEvent);
        assert_eq!(EventState::Paused.phase(), Phase::Execution);
        assert_eq!(EventState::Postponed.phase(), Phase::Special);
    }
}
