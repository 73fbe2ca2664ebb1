//! # Graph Subcommand
//!
//! Prints the lifecycle tables: for each state its phase, outgoing edges,
//! entry guard, entry actions and automatic rules.

use std::fmt::Write as _;

use anyhow::Result;
use clap::Args;

use atlas_state::{EventState, StateRegistry};

use crate::config::AtlasConfig;

/// Arguments for `atlas graph`.
#[derive(Args, Debug)]
pub struct GraphArgs {
    /// Only show this state.
    #[arg(long)]
    pub state: Option<EventState>,
}

/// Execute the graph subcommand.
pub fn run_graph(args: &GraphArgs, config: &AtlasConfig) -> Result<u8> {
    let registry = StateRegistry::standard(&config.lifecycle);
    print!("{}", render_graph(&registry, args.state));
    Ok(0)
}

/// Render the tables for `only`, or for every state.
pub fn render_graph(registry: &StateRegistry, only: Option<EventState>) -> String {
    let states: Vec<EventState> = match only {
        Some(state) => vec![state],
        None => EventState::ALL.to_vec(),
    };

    let mut out = String::new();
    for state in states {
        let _ = writeln!(out, "{state} [{:?}]", state.phase());

        let targets: Vec<&str> = registry
            .allowed_targets(state)
            .iter()
            .map(EventState::as_str)
            .collect();
        if targets.is_empty() {
            let _ = writeln!(out, "  -> (terminal)");
        } else {
            let _ = writeln!(out, "  -> {}", targets.join(", "));
        }

        if let Some(rule) = registry.requirements_for(state) {
            let validations: Vec<&str> = rule.validations.iter().map(|v| v.as_str()).collect();
            let _ = writeln!(
                out,
                "  requires: {} | validations: {}",
                rule.fields.join(", "),
                validations.join(", ")
            );
        }

        let actions = registry.actions_for(state);
        if !actions.is_empty() {
            let names: Vec<&str> = actions.iter().map(|a| a.as_str()).collect();
            let _ = writeln!(out, "  on entry: {}", names.join(", "));
        }

        let rules = registry.automatic_rule(state);
        if let Some(rule) = &rules.time_based {
            let _ = writeln!(out, "  auto (time): -> {} when {}", rule.to, rule.condition.describe());
        }
        if let Some(rule) = &rules.conditional {
            let _ = writeln!(
                out,
                "  auto (conditional): -> {} when {}",
                rule.to,
                rule.condition.describe()
            );
        }
    }
    out
}
