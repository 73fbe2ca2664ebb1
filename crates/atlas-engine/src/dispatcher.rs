//! # State-Entry Action Dispatch
//!
//! Runs the actions the registry lists for a newly entered state. The host
//! supplies one handler per [`ActionName`] at construction.
//!
//! ## Isolation
//!
//! Actions run one after another in list order. A failing handler, or an
//! action with no handler at all, is logged and recorded as a failed
//! [`ActionOutcome`]; the remaining actions still run. Nothing is retried,
//! reordered or rolled back, and a failure never reaches the transition's
//! caller as an error. The committed state change stands.

use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use atlas_state::{ActionName, Event, StateRegistry};

/// Why one action did not complete.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// No handler is registered for the action.
    #[error("no handler registered for action {0}")]
    HandlerNotRegistered(ActionName),

    /// The handler reported a failure.
    #[error("{0}")]
    Failed(String),
}

impl ActionError {
    /// Convenience constructor for handler failures.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Boxed future returned by [`ActionHandler::handle`].
pub type ActionFuture<'a> = Pin<Box<dyn Future<Output = Result<(), ActionError>> + Send + 'a>>;

/// A side effect bound to an action name.
///
/// Synchronous `Fn(&Event, &str) -> Result<(), ActionError>` closures
/// implement this directly.
pub trait ActionHandler: Send + Sync {
    /// Perform the side effect for `event`, on behalf of `actor`.
    fn handle<'a>(&'a self, event: &'a Event, actor: &'a str) -> ActionFuture<'a>;
}

impl<F> ActionHandler for F
where
    F: Fn(&Event, &str) -> Result<(), ActionError> + Send + Sync,
{
    fn handle<'a>(&'a self, event: &'a Event, actor: &'a str) -> ActionFuture<'a> {
        let result = self(event, actor);
        Box::pin(std::future::ready(result))
    }
}

/// Result of one action invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    /// The action that ran.
    pub action: ActionName,
    /// Whether it completed.
    pub ok: bool,
    /// The failure, when `ok` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ─── Registry ────────────────────────────────────────────────────────

/// Action name to handler map.
#[derive(Clone, Default)]
pub struct ActionRegistry {
    handlers: HashMap<ActionName, Arc<dyn ActionHandler>>,
}

impl ActionRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the handler for `action`.
    pub fn register(&mut self, action: ActionName, handler: impl ActionHandler + 'static) {
        self.handlers.insert(action, Arc::new(handler));
    }

    /// Builder-style [`ActionRegistry::register`].
    pub fn with(mut self, action: ActionName, handler: impl ActionHandler + 'static) -> Self {
        self.register(action, handler);
        self
    }

    /// Look up a handler.
    pub fn get(&self, action: ActionName) -> Option<Arc<dyn ActionHandler>> {
        self.handlers.get(&action).cloned()
    }

    /// Actions `registry` can emit that have no handler here.
    pub fn missing_handlers(&self, registry: &StateRegistry) -> BTreeSet<ActionName> {
        registry
            .referenced_actions()
            .into_iter()
            .filter(|action| !self.handlers.contains_key(action))
            .collect()
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.handlers.keys().collect();
        names.sort();
        f.debug_struct("ActionRegistry")
            .field("handlers", &names)
            .finish()
    }
}

// ─── Dispatcher ──────────────────────────────────────────────────────

/// Runs action lists against an [`ActionRegistry`].
#[derive(Debug, Clone, Default)]
pub struct ActionDispatcher {
    registry: ActionRegistry,
}

impl ActionDispatcher {
    /// Dispatch through `registry`.
    pub fn new(registry: ActionRegistry) -> Self {
        Self { registry }
    }

    /// The handlers in use.
    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// Run `actions` for `event` in order, one outcome per action.
    pub async fn dispatch(
        &self,
        event: &Event,
        actions: &[ActionName],
        actor: &str,
    ) -> Vec<ActionOutcome> {
        let mut outcomes = Vec::with_capacity(actions.len());

        for &action in actions {
            let result = match self.registry.get(action) {
                Some(handler) => handler.handle(event, actor).await,
                None => Err(ActionError::HandlerNotRegistered(action)),
            };

            let outcome = match result {
                Ok(()) => {
                    tracing::debug!(%action, event_id = %event.id, "action completed");
                    ActionOutcome {
                        action,
                        ok: true,
                        error: None,
                    }
                }
                Err(e) => {
                    tracing::error!(%action, event_id = %event.id, error = %e, "action failed");
                    metrics::counter!("atlas_action_failures_total", "action" => action.as_str())
                        .increment(1);
                    ActionOutcome {
                        action,
                        ok: false,
                        error: Some(e.to_string()),
                    }
                }
            };
            outcomes.push(outcome);
        }

        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_core::EventId;
    use atlas_state::LifecycleConfig;
    use parking_lot::Mutex;

    fn event() -> Event {
        Event::new(EventId::new("evt-dispatch").unwrap())
    }

    fn ok(_: &Event, _: &str) -> Result<(), ActionError> {
        Ok(())
    }

    #[tokio::test]
    async fn test_failure_is_isolated() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let log = |calls: &Arc<Mutex<Vec<ActionName>>>, action: ActionName, fail: bool| {
            let calls = calls.clone();
            move |_: &Event, _: &str| -> Result<(), ActionError> {
                calls.lock().push(action);
                if fail {
                    Err(ActionError::failed("smtp unavailable"))
                } else {
                    Ok(())
                }
            }
        };

        let registry = ActionRegistry::new()
            .with(ActionName::DisableCheckIn, log(&calls, ActionName::DisableCheckIn, false))
            .with(ActionName::SendFeedbackSurvey, log(&calls, ActionName::SendFeedbackSurvey, true))
            .with(ActionName::GenerateFinalReport, log(&calls, ActionName::GenerateFinalReport, false));
        let dispatcher = ActionDispatcher::new(registry);

        let actions = [
            ActionName::DisableCheckIn,
            ActionName::SendFeedbackSurvey,
            ActionName::GenerateFinalReport,
        ];
        let outcomes = dispatcher.dispatch(&event(), &actions, "user1").await;

        assert_eq!(calls.lock().as_slice(), &actions);
        assert_eq!(
            outcomes.iter().map(|o| o.ok).collect::<Vec<_>>(),
            vec![true, false, true]
        );
        assert_eq!(outcomes[1].error.as_deref(), Some("smtp unavailable"));
    }

    #[tokio::test]
    async fn test_missing_handler_recorded_as_failure() {
        let dispatcher = ActionDispatcher::new(ActionRegistry::new().with(ActionName::EnableCheckIn, ok));
        let outcomes = dispatcher
            .dispatch(
                &event(),
                &[ActionName::NotifyStakeholders, ActionName::EnableCheckIn],
                "user1",
            )
            .await;
        assert!(!outcomes[0].ok);
        assert_eq!(
            outcomes[0].error.as_deref(),
            Some("no handler registered for action notify_stakeholders")
        );
        assert!(outcomes[1].ok);
    }

    #[tokio::test]
    async fn test_handler_receives_actor() {
        let seen = Arc::new(Mutex::new(String::new()));
        let sink = seen.clone();
        let dispatcher = ActionDispatcher::new(ActionRegistry::new().with(
            ActionName::ArchiveEventData,
            move |_: &Event, actor: &str| -> Result<(), ActionError> {
                *sink.lock() = actor.to_string();
                Ok(())
            },
        ));
        dispatcher
            .dispatch(&event(), &[ActionName::ArchiveEventData], "system")
            .await;
        assert_eq!(seen.lock().as_str(), "system");
    }

    #[tokio::test]
    async fn test_empty_action_list() {
        let dispatcher = ActionDispatcher::default();
        assert!(dispatcher.dispatch(&event(), &[], "user1").await.is_empty());
    }

    #[test]
    fn test_missing_handlers_coverage() {
        let registry = StateRegistry::standard(&LifecycleConfig::default());
        let handlers = ActionRegistry::new().with(ActionName::NotifyStakeholders, ok);
        let missing = handlers.missing_handlers(&registry);
        assert_eq!(missing.len(), ActionName::ALL.len() - 1);
        assert!(!missing.contains(&ActionName::NotifyStakeholders));
    }
}
