//! # Transition Engine
//!
//! Executes state changes for events held in an [`EventStore`].
//!
//! ## One transition
//!
//! 1. Load the event ([`TransitionError::EventNotFound`] if absent).
//! 2. Check the edge against the graph. Forcing never skips this.
//! 3. Unless forced, evaluate the target's entry requirements and collect
//!    every violation.
//! 4. Commit with the pure `Event::apply` transform and a version
//!    compare-and-swap. Lost races reload and retry the link.
//! 5. Dispatch the target's state-entry actions. Failures are recorded in
//!    the result and never undo the commit.
//! 6. Notify observers.
//!
//! A link rejected at any of steps 1 to 4 is logged, counted and announced
//! to error observers before the error is returned.
//!
//! ## Chaining
//!
//! After a commit the engine reloads the event and asks the scanner whether
//! an automatic rule now applies. If one does it commits that link too, as
//! the system actor and with requirements still enforced, and repeats. The
//! chain is iterative and bounded by `max_chain_depth`. A follow-up that
//! fails stops the chain, is reported to error observers, and leaves every
//! committed link in place.
//!
//! ## Concurrency
//!
//! A per-event async mutex is held for the whole call, chain included, so
//! two transitions on one event never interleave inside one engine.
//! Different events proceed concurrently.

use std::collections::HashMap;
use std::sync::Arc;

use atlas_core::{Clock, EventId, SystemClock};
use atlas_state::{
    AutomaticEdge, AutomaticTransitionScanner, Event, EventState, LifecycleConfig, StateRegistry,
    StateUpdate, TransitionRecord, ValidationRegistry,
};

use crate::config::EngineConfig;
use crate::dispatcher::{ActionDispatcher, ActionOutcome, ActionRegistry};
use crate::error::TransitionError;
use crate::observer::{Observers, StateTransitionNotice, TransitionErrorNotice};
use crate::store::{EventStore, StoreError};

// ─── Request and result types ────────────────────────────────────────

/// Per-call options for [`TransitionEngine::transition`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionOptions {
    /// Skip entry requirements. The graph is still enforced.
    pub force: bool,
    /// Free-text reason stored in the history record.
    pub reason: Option<String>,
    /// Fail with [`TransitionError::StateChanged`] unless the event is
    /// currently in this state.
    pub expected_from: Option<EventState>,
}

impl TransitionOptions {
    /// Default options: not forced, no reason, no state precondition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip entry requirements.
    pub fn forced(mut self) -> Self {
        self.force = true;
        self
    }

    /// Attach a reason.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Require the event to be in `state` when the transition runs.
    pub fn expecting(mut self, state: EventState) -> Self {
        self.expected_from = Some(state);
        self
    }
}

/// One committed link of a transition chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionStep {
    /// The history record appended by this link.
    pub record: TransitionRecord,
    /// State-entry action outcomes, in dispatch order.
    pub actions: Vec<ActionOutcome>,
    /// Whether an automatic rule produced this link.
    pub automatic: bool,
}

impl TransitionStep {
    /// Actions that did not complete.
    pub fn failed_actions(&self) -> impl Iterator<Item = &ActionOutcome> {
        self.actions.iter().filter(|outcome| !outcome.ok)
    }
}

/// Why automatic chaining stopped early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainHalt {
    /// `max_chain_depth` automatic links were committed and another one
    /// still qualified.
    DepthExceeded {
        max_depth: usize,
        /// The edge that would have been taken next.
        pending: AutomaticEdge,
    },
    /// An automatic follow-up was rejected or could not be stored.
    FollowUpFailed {
        edge: AutomaticEdge,
        error: TransitionError,
    },
}

/// Outcome of a successful [`TransitionEngine::transition`] call.
#[derive(Debug, Clone)]
pub struct TransitionResult {
    pub event_id: EventId,
    /// Every committed link, the requested one first.
    pub steps: Vec<TransitionStep>,
    /// Set when automatic chaining stopped on a failure or the depth bound.
    pub chain_halt: Option<ChainHalt>,
    /// The event as last seen after the chain finished.
    pub event: Event,
}

impl TransitionResult {
    /// History records produced by this call, oldest first.
    pub fn records(&self) -> impl Iterator<Item = &TransitionRecord> {
        self.steps.iter().map(|step| &step.record)
    }

    /// The state the call left the event in.
    pub fn final_state(&self) -> EventState {
        self.event.status
    }
}

// ─── Engine ──────────────────────────────────────────────────────────

/// Guarded, chained state transitions over an [`EventStore`].
pub struct TransitionEngine<S> {
    store: S,
    registry: Arc<StateRegistry>,
    validations: Arc<ValidationRegistry>,
    dispatcher: ActionDispatcher,
    scanner: AutomaticTransitionScanner,
    clock: Arc<dyn Clock>,
    observers: Observers,
    config: EngineConfig,
    locks: parking_lot::Mutex<HashMap<EventId, Arc<tokio::sync::Mutex<()>>>>,
}

impl<S: EventStore> TransitionEngine<S> {
    /// Start configuring an engine over `store`.
    pub fn builder(store: S) -> TransitionEngineBuilder<S> {
        TransitionEngineBuilder::new(store)
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The lifecycle tables in use.
    pub fn registry(&self) -> &Arc<StateRegistry> {
        &self.registry
    }

    /// The automatic transition scanner, sharing the engine's clock.
    pub fn scanner(&self) -> &AutomaticTransitionScanner {
        &self.scanner
    }

    /// Register observers here.
    pub fn observers(&self) -> &Observers {
        &self.observers
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Move `event_id` into `target` on behalf of `actor`, then follow any
    /// automatic transitions that become due.
    ///
    /// Failures of the requested link are returned and leave the event
    /// untouched. Failures of automatic follow-ups are not errors; they are
    /// reported through [`TransitionResult::chain_halt`]. Either kind of
    /// failure reaches [`Observers::on_transition_error`] callbacks.
    pub async fn transition(
        &self,
        event_id: &EventId,
        target: EventState,
        actor: &str,
        options: TransitionOptions,
    ) -> Result<TransitionResult, TransitionError> {
        let lock = self.event_lock(event_id);
        let result = {
            let _guard = lock.lock().await;
            self.transition_locked(event_id, target, actor, &options).await
        };
        drop(lock);
        self.release_event_lock(event_id);
        result
    }

    async fn transition_locked(
        &self,
        event_id: &EventId,
        target: EventState,
        actor: &str,
        options: &TransitionOptions,
    ) -> Result<TransitionResult, TransitionError> {
        let (event, step) = self
            .commit_link(event_id, target, actor, options, false)
            .await?;
        let mut steps = vec![step];
        let (event, chain_halt) = self.follow_automatic_chain(event, &mut steps).await;

        Ok(TransitionResult {
            event_id: event_id.clone(),
            steps,
            chain_halt,
            event,
        })
    }

    /// Validate, commit, dispatch and announce a single link.
    async fn commit_link(
        &self,
        event_id: &EventId,
        target: EventState,
        actor: &str,
        options: &TransitionOptions,
        automatic: bool,
    ) -> Result<(Event, TransitionStep), TransitionError> {
        let mut conflicts = 0;

        let (committed, record) = loop {
            let event = match self.store.load(event_id).await {
                Ok(event) => event,
                Err(StoreError::NotFound(id)) => {
                    return Err(self.rejected(
                        TransitionError::EventNotFound(id),
                        event_id,
                        None,
                        target,
                        automatic,
                    ))
                }
                Err(e) => return Err(self.rejected(e.into(), event_id, None, target, automatic)),
            };
            let from = event.status;

            if let Some(expected) = options.expected_from {
                if from != expected {
                    return Err(self.rejected(
                        TransitionError::StateChanged {
                            event_id: event_id.clone(),
                            expected,
                            actual: from,
                        },
                        event_id,
                        Some(from),
                        target,
                        automatic,
                    ));
                }
            }

            if !self.registry.can_transition(from, target) {
                return Err(self.rejected(
                    TransitionError::InvalidTransition {
                        event_id: event_id.clone(),
                        from,
                        to: target,
                        forced: options.force,
                    },
                    event_id,
                    Some(from),
                    target,
                    automatic,
                ));
            }

            if !options.force {
                if let Some(rule) = self.registry.requirements_for(target) {
                    let violations = rule.evaluate(&event, &self.validations).await;
                    if !violations.is_empty() {
                        return Err(self.rejected(
                            TransitionError::RequirementsNotMet {
                                event_id: event_id.clone(),
                                target,
                                violations,
                            },
                            event_id,
                            Some(from),
                            target,
                            automatic,
                        ));
                    }
                }
            }

            let record = TransitionRecord {
                from_state: from,
                to_state: target,
                actor: actor.to_string(),
                timestamp: self.clock.now(),
                reason: options.reason.clone(),
                forced: options.force,
            };
            let expected_version = event.version;
            let next = event.apply(StateUpdate::new(record.clone()));

            match self.store.save(next.clone(), expected_version).await {
                Ok(()) => break (next, record),
                Err(StoreError::VersionConflict { .. })
                    if conflicts < self.config.max_conflict_retries =>
                {
                    conflicts += 1;
                    tracing::debug!(event_id = %event_id, attempt = conflicts, "version conflict, retrying");
                }
                Err(e) => {
                    return Err(self.rejected(e.into(), event_id, Some(from), target, automatic))
                }
            }
        };

        tracing::info!(
            event_id = %event_id,
            from = %record.from_state,
            to = %record.to_state,
            actor = %record.actor,
            forced = record.forced,
            automatic,
            "state transition committed"
        );
        metrics::counter!(
            "atlas_transitions_total",
            "to" => target.as_str(),
            "automatic" => if automatic { "true" } else { "false" }
        )
        .increment(1);

        let actions = self
            .dispatcher
            .dispatch(&committed, self.registry.actions_for(target), actor)
            .await;

        self.observers.notify_transition(&StateTransitionNotice {
            event_id: event_id.clone(),
            from_state: record.from_state,
            to_state: record.to_state,
            actor: record.actor.clone(),
            timestamp: record.timestamp,
            forced: record.forced,
            automatic,
            actions: actions.clone(),
        });

        Ok((
            committed,
            TransitionStep {
                record,
                actions,
                automatic,
            },
        ))
    }

    /// Commit automatic links until none qualifies, one fails, or the depth
    /// bound is reached.
    async fn follow_automatic_chain(
        &self,
        committed: Event,
        steps: &mut Vec<TransitionStep>,
    ) -> (Event, Option<ChainHalt>) {
        let event_id = committed.id.clone();
        let mut event = committed;
        let mut depth = 0;

        loop {
            // Actions may have written to the record.
            event = match self.store.load(&event_id).await {
                Ok(fresh) => fresh,
                Err(e) => {
                    tracing::warn!(event_id = %event_id, error = %e, "reload before automatic scan failed");
                    event
                }
            };

            let Some(edge) = self.scanner.next_automatic_edge(&event) else {
                return (event, None);
            };

            if depth >= self.config.max_chain_depth {
                tracing::warn!(
                    event_id = %event_id,
                    max_depth = self.config.max_chain_depth,
                    pending = %edge.to,
                    "automatic chain depth reached, not following further"
                );
                return (
                    event,
                    Some(ChainHalt::DepthExceeded {
                        max_depth: self.config.max_chain_depth,
                        pending: edge,
                    }),
                );
            }

            let options = TransitionOptions::new()
                .with_reason(edge.reason.clone())
                .expecting(edge.from);
            match self
                .commit_link(&event_id, edge.to, &self.config.system_actor, &options, true)
                .await
            {
                Ok((next, step)) => {
                    steps.push(step);
                    event = next;
                    depth += 1;
                }
                Err(error) => {
                    tracing::warn!(
                        event_id = %event_id,
                        from = %edge.from,
                        to = %edge.to,
                        error = %error,
                        "automatic follow-up transition failed"
                    );
                    return (event, Some(ChainHalt::FollowUpFailed { edge, error }));
                }
            }
        }
    }

    /// Log, count and announce a failed link, then hand the error back.
    fn rejected(
        &self,
        error: TransitionError,
        event_id: &EventId,
        from: Option<EventState>,
        target: EventState,
        automatic: bool,
    ) -> TransitionError {
        tracing::warn!(
            event_id = %event_id,
            to = %target,
            automatic,
            kind = error.kind(),
            error = %error,
            "transition rejected"
        );
        metrics::counter!("atlas_transition_rejections_total", "kind" => error.kind()).increment(1);
        self.observers.notify_transition_error(&TransitionErrorNotice {
            event_id: event_id.clone(),
            from_state: from,
            to_state: target,
            automatic,
            kind: error.kind().to_string(),
            message: error.to_string(),
        });
        error
    }

    fn event_lock(&self, event_id: &EventId) -> Arc<tokio::sync::Mutex<()>> {
        self.locks
            .lock()
            .entry(event_id.clone())
            .or_default()
            .clone()
    }

    /// Drop the lock entry once no caller holds or waits on it.
    fn release_event_lock(&self, event_id: &EventId) {
        let mut locks = self.locks.lock();
        if locks
            .get(event_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(event_id);
        }
    }

    #[cfg(test)]
    pub(crate) fn tracked_locks(&self) -> usize {
        self.locks.lock().len()
    }
}

impl<S> std::fmt::Debug for TransitionEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionEngine")
            .field("config", &self.config)
            .field("validations", &self.validations)
            .field("actions", self.dispatcher.registry())
            .field("observers", &self.observers)
            .finish_non_exhaustive()
    }
}

// ─── Builder ─────────────────────────────────────────────────────────

/// Configures a [`TransitionEngine`].
///
/// Defaults: the standard lifecycle with default windows, the standard
/// validations, no action handlers, the system clock and
/// [`EngineConfig::default`].
pub struct TransitionEngineBuilder<S> {
    store: S,
    registry: Option<Arc<StateRegistry>>,
    validations: Option<ValidationRegistry>,
    actions: ActionRegistry,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl<S: EventStore> TransitionEngineBuilder<S> {
    fn new(store: S) -> Self {
        Self {
            store,
            registry: None,
            validations: None,
            actions: ActionRegistry::new(),
            clock: Arc::new(SystemClock),
            config: EngineConfig::default(),
        }
    }

    /// Use these lifecycle tables.
    pub fn registry(mut self, registry: impl Into<Arc<StateRegistry>>) -> Self {
        self.registry = Some(registry.into());
        self
    }

    /// Use these validation predicates.
    pub fn validations(mut self, validations: ValidationRegistry) -> Self {
        self.validations = Some(validations);
        self
    }

    /// Use these action handlers.
    pub fn actions(mut self, actions: ActionRegistry) -> Self {
        self.actions = actions;
        self
    }

    /// Read time from `clock`.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Use `config`.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Assemble the engine.
    pub fn build(self) -> TransitionEngine<S> {
        let registry = self
            .registry
            .unwrap_or_else(|| Arc::new(StateRegistry::standard(&LifecycleConfig::default())));
        let validations = self
            .validations
            .unwrap_or_else(ValidationRegistry::with_standard_validations);

        let missing = self.actions.missing_handlers(&registry);
        if !missing.is_empty() {
            tracing::debug!(?missing, "actions without a handler will be recorded as failed");
        }

        TransitionEngine {
            scanner: AutomaticTransitionScanner::new(registry.clone(), self.clock.clone()),
            store: self.store,
            registry,
            validations: Arc::new(validations),
            dispatcher: ActionDispatcher::new(self.actions),
            clock: self.clock,
            observers: Observers::new(),
            config: self.config,
            locks: parking_lot::Mutex::new(HashMap::new()),
        }
    }
}
