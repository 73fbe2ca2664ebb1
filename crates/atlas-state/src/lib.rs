//! # atlas-state: The Event Lifecycle Model
//!
//! Everything the engine needs to know about the lifecycle, as data:
//!
//! - **States** (`state.rs`): the 20 lifecycle states grouped into phases,
//!   with `archived` as the single terminal state.
//!
//! - **Registry** (`registry.rs`): the transition graph, entry requirements,
//!   ordered state-entry actions and automatic rules. Built once per process
//!   and never mutated.
//!
//! - **Requirements** (`requirements.rs`, `validation.rs`): required field
//!   paths plus named async validations. Evaluation collects every
//!   violation instead of stopping at the first.
//!
//! - **Automatic rules** (`automatic.rs`): time-based rules against an
//!   injected clock and data-driven conditional rules, plus the scanner that
//!   detects which edge an event qualifies for.
//!
//! - **Event record** (`event.rs`): the host's record as an open JSON map
//!   with dotted-path access, and the pure `(Event, StateUpdate) -> Event`
//!   commit transform.
//!
//! Nothing here performs I/O or side effects. Committing transitions and
//! running actions live in `atlas-engine`.

pub mod action;
pub mod automatic;
pub mod config;
pub mod error;
pub mod event;
pub mod registry;
pub mod requirements;
pub mod state;
pub mod validation;

// ─── Model re-exports ───────────────────────────────────────────────

pub use action::ActionName;
pub use error::StateError;
pub use event::{Event, StateUpdate, TransitionRecord};
pub use state::{EventState, Phase};

// ─── Registry re-exports ────────────────────────────────────────────

pub use config::LifecycleConfig;
pub use registry::{RegistryBuilder, StateRegistry};
pub use requirements::{RequirementRule, RequirementViolation};
pub use validation::{Validation, ValidationName, ValidationOutcome, ValidationRegistry};

// ─── Automatic transition re-exports ────────────────────────────────

pub use automatic::{
    AutomaticEdge, AutomaticRule, AutomaticRules, AutomaticTransitionScanner, DataCondition,
    RuleKind, ScanHit, TimeCondition,
};
