//! # atlas-cli: Command-Line Front End for the Lifecycle Engine
//!
//! Provides the `atlas` binary. Commands operate on a JSON file holding an
//! array of event records; action handlers only log.
//!
//! ## Subcommands
//!
//! - `atlas graph`: Print states, edges, guards, actions and automatic rules.
//! - `atlas transition`: Run one transition (with chaining) and write back.
//! - `atlas scan`: List qualifying automatic transitions, or apply them.
//! - `atlas check-handlers`: Report actions and validations without an
//!   implementation.
//!
//! ```bash
//! atlas graph --state registration_open
//! atlas transition --events events.json --event evt-1 --to planning --actor alice
//! atlas scan --events events.json --now 2026-05-01T00:00:00Z --apply
//! ```

pub mod check;
pub mod config;
pub mod events_file;
pub mod graph;
pub mod handlers;
pub mod scan;
pub mod transition;

use std::sync::Arc;

use atlas_core::{Clock, ManualClock, SystemClock, Timestamp};
use atlas_engine::{InMemoryEventStore, TransitionEngine};
use atlas_state::{StateRegistry, ValidationRegistry};

use crate::config::AtlasConfig;

/// The system clock, or a clock pinned at `now`.
pub fn clock_at(now: Option<Timestamp>) -> Arc<dyn Clock> {
    match now {
        Some(now) => Arc::new(ManualClock::new(now)),
        None => Arc::new(SystemClock),
    }
}

/// An engine over `store` with the standard lifecycle, standard
/// validations and the logging action handlers.
pub fn build_engine(
    config: &AtlasConfig,
    store: InMemoryEventStore,
    clock: Arc<dyn Clock>,
) -> TransitionEngine<InMemoryEventStore> {
    TransitionEngine::builder(store)
        .registry(StateRegistry::standard(&config.lifecycle))
        .validations(ValidationRegistry::with_standard_validations())
        .actions(handlers::logging_handlers())
        .clock(clock)
        .config(config.engine.clone())
        .build()
}
