//! # Check-Handlers Subcommand
//!
//! Startup coverage check: every action the lifecycle can emit needs a
//! handler, and every validation a guard names needs a predicate. Missing
//! actions would be recorded as failures at runtime; missing validations
//! would block their guarded transitions.

use anyhow::Result;

use atlas_state::{StateRegistry, ValidationRegistry};

use crate::config::AtlasConfig;
use crate::handlers::logging_handlers;

/// Execute the check-handlers subcommand. Exits with 1 when anything is
/// missing.
pub fn run_check_handlers(config: &AtlasConfig) -> Result<u8> {
    let registry = StateRegistry::standard(&config.lifecycle);
    let missing_actions = logging_handlers().missing_handlers(&registry);
    let missing_validations = ValidationRegistry::with_standard_validations().missing(&registry);

    for action in &missing_actions {
        println!("MISSING: action handler {action}");
    }
    for validation in &missing_validations {
        println!("MISSING: validation {validation}");
    }

    if missing_actions.is_empty() && missing_validations.is_empty() {
        println!(
            "OK: {} actions and {} validations covered",
            registry.referenced_actions().len(),
            registry.referenced_validations().len()
        );
        Ok(0)
    } else {
        Ok(1)
    }
}
