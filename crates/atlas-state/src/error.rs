//! Errors raised while parsing lifecycle names or assembling a registry.

use thiserror::Error;

use crate::state::EventState;

/// Errors from the state registry layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// A state name outside the fixed enumeration.
    #[error("unknown event state: {0:?}")]
    UnknownState(String),

    /// An action name outside the fixed enumeration.
    #[error("unknown action: {0:?}")]
    UnknownAction(String),

    /// A validation name outside the fixed enumeration.
    #[error("unknown validation: {0:?}")]
    UnknownValidation(String),

    /// An automatic rule targets a state its source cannot reach.
    #[error("automatic rule {from} -> {to} has no matching edge in the transition graph")]
    RuleWithoutEdge {
        /// Source state of the rule.
        from: EventState,
        /// Target state of the rule.
        to: EventState,
    },

    /// A terminal state was given outgoing edges.
    #[error("terminal state {state} must not have outgoing edges")]
    TerminalHasEdges {
        /// The offending state.
        state: EventState,
    },
}
