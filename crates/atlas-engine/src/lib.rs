//! # atlas-engine: Event Lifecycle Transition Engine
//!
//! Drives events through the lifecycle defined in `atlas-state`.
//!
//! - **Engine** (`engine.rs`): guarded transitions, forced overrides that
//!   still respect the graph, the pure commit transform over a versioned
//!   store, and bounded automatic chaining.
//! - **Store** (`store.rs`): the `EventStore` contract with a version
//!   compare-and-swap, and an in-memory implementation.
//! - **Dispatcher** (`dispatcher.rs`): ordered, isolated state-entry action
//!   dispatch through host-supplied handlers.
//! - **Observers** (`observer.rs`): typed callbacks for commits and failed
//!   attempts.
//! - **Scheduled scan** (`scheduler.rs`): the periodic sweep for
//!   time-based transitions.
//!
//! ## Metrics
//!
//! Counters are emitted through the `metrics` facade; installing a
//! recorder is up to the host.
//!
//! - `atlas_transitions_total{to, automatic}`
//! - `atlas_transition_rejections_total{kind}`
//! - `atlas_action_failures_total{action}`

pub mod config;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod observer;
pub mod scheduler;
pub mod store;

pub use config::EngineConfig;
pub use dispatcher::{
    ActionDispatcher, ActionError, ActionFuture, ActionHandler, ActionOutcome, ActionRegistry,
};
pub use engine::{
    ChainHalt, TransitionEngine, TransitionEngineBuilder, TransitionOptions, TransitionResult,
    TransitionStep,
};
pub use error::TransitionError;
pub use observer::{Observers, StateTransitionNotice, TransitionErrorNotice};
pub use scheduler::{ScanCandidate, ScanEntry, ScanReport};
pub use store::{EventStore, InMemoryEventStore, StoreError};
