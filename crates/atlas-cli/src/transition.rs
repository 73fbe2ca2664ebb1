//! # Transition Subcommand
//!
//! Runs one requested transition, follows any automatic chain, and writes
//! the events file back. Rejections print every reason and exit with 1
//! without touching the file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use atlas_core::{EventId, Timestamp};
use atlas_engine::{ChainHalt, TransitionError, TransitionOptions, TransitionResult};
use atlas_state::EventState;

use crate::config::AtlasConfig;
use crate::events_file::{load_events, save_events};
use crate::{build_engine, clock_at};

/// Arguments for `atlas transition`.
#[derive(Args, Debug)]
pub struct TransitionArgs {
    /// JSON file holding an array of events.
    #[arg(long)]
    pub events: PathBuf,
    /// Id of the event to move.
    #[arg(long)]
    pub event: String,
    /// Target state.
    #[arg(long)]
    pub to: EventState,
    /// Actor recorded in the history.
    #[arg(long, default_value = "cli")]
    pub actor: String,
    /// Skip entry requirements. Graph edges are still enforced.
    #[arg(long)]
    pub force: bool,
    /// Reason recorded in the history.
    #[arg(long)]
    pub reason: Option<String>,
    /// Evaluate time-based rules as of this instant instead of now.
    #[arg(long)]
    pub now: Option<Timestamp>,
}

/// Execute the transition subcommand.
pub async fn run_transition(args: &TransitionArgs, config: &AtlasConfig) -> Result<u8> {
    let event_id = EventId::new(args.event.as_str()).context("invalid event id")?;
    let store = load_events(&args.events)?;
    let engine = build_engine(config, store, clock_at(args.now));

    let mut options = TransitionOptions::new();
    if args.force {
        options = options.forced();
    }
    if let Some(reason) = &args.reason {
        options = options.with_reason(reason.clone());
    }

    match engine.transition(&event_id, args.to, &args.actor, options).await {
        Ok(result) => {
            save_events(&args.events, engine.store())?;
            print_result(&result);
            Ok(0)
        }
        Err(TransitionError::Store(e)) => Err(e).context("event store failure"),
        Err(e) => {
            println!("REJECTED: {e}");
            if let TransitionError::RequirementsNotMet { violations, .. } = &e {
                for violation in violations {
                    println!("  - {violation}");
                }
            }
            Ok(1)
        }
    }
}

fn print_result(result: &TransitionResult) {
    for step in &result.steps {
        let record = &step.record;
        let origin = if step.automatic { "auto" } else { "manual" };
        let forced = if record.forced { " (forced)" } else { "" };
        println!(
            "OK: {} {} -> {} by {} [{origin}]{forced}",
            result.event_id, record.from_state, record.to_state, record.actor
        );
        for failed in step.failed_actions() {
            println!(
                "  action {} failed: {}",
                failed.action,
                failed.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    match &result.chain_halt {
        Some(ChainHalt::DepthExceeded { max_depth, pending }) => println!(
            "WARN: automatic chain stopped after {max_depth} links; {} -> {} still due",
            pending.from, pending.to
        ),
        Some(ChainHalt::FollowUpFailed { edge, error }) => println!(
            "WARN: automatic {} -> {} failed: {error}",
            edge.from, edge.to
        ),
        None => {}
    }
}
