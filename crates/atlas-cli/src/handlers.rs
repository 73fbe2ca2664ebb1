//! Built-in action handlers.
//!
//! The CLI has no mail server, portal or report generator to talk to, so
//! every handler logs the action it would have performed and succeeds.

use atlas_engine::{ActionError, ActionRegistry};
use atlas_state::{ActionName, Event};

/// A registry with a logging handler for every action name.
pub fn logging_handlers() -> ActionRegistry {
    ActionName::ALL
        .into_iter()
        .fold(ActionRegistry::new(), |registry, action| {
            registry.with(
                action,
                move |event: &Event, actor: &str| -> Result<(), ActionError> {
                    tracing::info!(%action, event_id = %event.id, actor, "action performed");
                    Ok(())
                },
            )
        })
}
