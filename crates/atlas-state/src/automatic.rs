//! # Automatic Transitions
//!
//! Two independent kinds of unattended transition, keyed by the event's
//! current state:
//!
//! - **time-based** rules compare a deadline field against the injected
//!   [`Clock`] (registration closes itself once its deadline passes);
//! - **conditional** rules look only at event data (review completes once
//!   no reviews are pending).
//!
//! A state carries at most one rule of each kind. When both could fire the
//! time-based rule wins.
//!
//! The [`AutomaticTransitionScanner`] only *detects* qualifying edges. It
//! never commits anything; callers feed its answers into the transition
//! engine, which applies guards, history and side effects as usual.

use std::sync::Arc;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use atlas_core::{Clock, Timestamp};

use crate::event::Event;
use crate::registry::StateRegistry;
use crate::state::EventState;

// ─── Conditions ──────────────────────────────────────────────────────

/// A clock-dependent exit condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeCondition {
    /// Holds once `now` is within `window` of the instant at `path`, or past it.
    DeadlineApproaching {
        /// Dotted path of the deadline field.
        path: String,
        /// How far ahead of the deadline the condition starts to hold.
        window: Duration,
    },
    /// Holds once `now` is at or after the instant at `path`.
    Reached {
        /// Dotted path of the instant field.
        path: String,
    },
}

impl TimeCondition {
    /// Evaluate against `event` at `now`. A missing or unparseable instant
    /// never satisfies the condition.
    pub fn is_met(&self, event: &Event, now: Timestamp) -> bool {
        match self {
            Self::DeadlineApproaching { path, window } => event
                .instant(path)
                .and_then(|deadline| deadline.checked_sub(*window))
                .is_some_and(|opens_at| now >= opens_at),
            Self::Reached { path } => event.instant(path).is_some_and(|at| now >= at),
        }
    }

    /// Short description used in transition reasons.
    pub fn describe(&self) -> String {
        match self {
            Self::DeadlineApproaching { path, window } => {
                format!("{path} is within {}h", window.num_hours())
            }
            Self::Reached { path } => format!("{path} has passed"),
        }
    }
}

/// A data-only exit condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataCondition {
    /// Holds when the field at `path` is boolean `true`.
    FlagSet {
        /// Dotted path of the flag.
        path: String,
    },
    /// Holds when the counter at `total` is positive and the counter at
    /// `pending` is zero.
    NonePending {
        /// Dotted path of the total counter.
        total: String,
        /// Dotted path of the pending counter.
        pending: String,
    },
}

impl DataCondition {
    /// Evaluate against `event`.
    pub fn is_met(&self, event: &Event) -> bool {
        match self {
            Self::FlagSet { path } => event.field(path).and_then(Value::as_bool) == Some(true),
            Self::NonePending { total, pending } => {
                let total = event.field(total).and_then(Value::as_u64);
                let pending = event.field(pending).and_then(Value::as_u64);
                matches!((total, pending), (Some(t), Some(0)) if t > 0)
            }
        }
    }

    /// Short description used in transition reasons.
    pub fn describe(&self) -> String {
        match self {
            Self::FlagSet { path } => format!("{path} is set"),
            Self::NonePending { total, pending } => {
                format!("{pending} is zero with {total} positive")
            }
        }
    }
}

// ─── Rules ───────────────────────────────────────────────────────────

/// One automatic rule: the state to move into and the condition to wait for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutomaticRule<C> {
    /// Target state.
    pub to: EventState,
    /// Exit condition.
    pub condition: C,
}

/// The automatic rules attached to one source state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutomaticRules {
    /// Clock-driven rule, checked first.
    pub time_based: Option<AutomaticRule<TimeCondition>>,
    /// Data-driven rule.
    pub conditional: Option<AutomaticRule<DataCondition>>,
}

impl AutomaticRules {
    /// Whether neither kind of rule is present.
    pub fn is_empty(&self) -> bool {
        self.time_based.is_none() && self.conditional.is_none()
    }
}

/// Which kind of rule produced an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Clock-driven.
    TimeBased,
    /// Data-driven.
    Conditional,
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TimeBased => f.write_str("time-based"),
            Self::Conditional => f.write_str("conditional"),
        }
    }
}

/// A qualifying automatic transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomaticEdge {
    /// The state the event was in when the rule was evaluated.
    pub from: EventState,
    /// The state the rule moves it into.
    pub to: EventState,
    /// Which kind of rule fired.
    pub kind: RuleKind,
    /// Reason recorded in the transition history.
    pub reason: String,
}

/// An event picked up by a batch scan, with the edge it qualifies for.
#[derive(Debug, Clone)]
pub struct ScanHit<'a> {
    /// The qualifying event.
    pub event: &'a Event,
    /// The edge to apply.
    pub edge: AutomaticEdge,
}

// ─── Scanner ─────────────────────────────────────────────────────────

/// Detects automatic transitions whose condition already holds.
#[derive(Clone)]
pub struct AutomaticTransitionScanner {
    registry: Arc<StateRegistry>,
    clock: Arc<dyn Clock>,
}

impl AutomaticTransitionScanner {
    /// Create a scanner over `registry` reading time from `clock`.
    pub fn new(registry: Arc<StateRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self { registry, clock }
    }

    /// The edge `event` should take right now, if any.
    ///
    /// Time-based rule first, then conditional.
    pub fn next_automatic_edge(&self, event: &Event) -> Option<AutomaticEdge> {
        let rules = self.registry.automatic_rule(event.status);
        let now = self.clock.now();

        if let Some(rule) = &rules.time_based {
            if rule.condition.is_met(event, now) {
                return Some(edge(event.status, rule.to, RuleKind::TimeBased, rule.condition.describe()));
            }
        }
        if let Some(rule) = &rules.conditional {
            if rule.condition.is_met(event) {
                return Some(edge(event.status, rule.to, RuleKind::Conditional, rule.condition.describe()));
            }
        }
        None
    }

    /// States whose events are candidates for [`Self::scan_all_qualifying`].
    pub fn candidate_states(&self) -> Vec<EventState> {
        self.registry.states_with_time_rules()
    }

    /// Batch form for periodic schedulers.
    ///
    /// Only events whose current state has a time-based rule are considered,
    /// and only the time-based rule is evaluated. Data-driven rules are
    /// picked up by the chaining step of an ordinary transition.
    pub fn scan_all_qualifying<'a, I>(&self, events: I) -> Vec<ScanHit<'a>>
    where
        I: IntoIterator<Item = &'a Event>,
    {
        let now = self.clock.now();
        events
            .into_iter()
            .filter_map(|event| {
                let rule = self.registry.automatic_rule(event.status).time_based.as_ref()?;
                if !rule.condition.is_met(event, now) {
                    return None;
                }
                Some(ScanHit {
                    event,
                    edge: edge(event.status, rule.to, RuleKind::TimeBased, rule.condition.describe()),
                })
            })
            .collect()
    }
}

impl std::fmt::Debug for AutomaticTransitionScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutomaticTransitionScanner")
            .field("now", &self.clock.now())
            .finish_non_exhaustive()
    }
}

fn edge(from: EventState, to: EventState, kind: RuleKind, description: String) -> AutomaticEdge {
    AutomaticEdge {
        from,
        to,
        kind,
        reason: format!("automatic {kind} transition {from} -> {to}: {description}"),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
