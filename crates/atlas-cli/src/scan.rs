//! # Scan Subcommand
//!
//! Lists events that qualify for a time-based transition. With `--apply`
//! the transitions are run through the engine as the system actor and the
//! events file is written back.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use atlas_core::Timestamp;

use crate::config::AtlasConfig;
use crate::events_file::{load_events, save_events};
use crate::{build_engine, clock_at};

/// Arguments for `atlas scan`.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// JSON file holding an array of events.
    #[arg(long)]
    pub events: PathBuf,
    /// Evaluate rules as of this instant instead of now.
    #[arg(long)]
    pub now: Option<Timestamp>,
    /// Apply the qualifying transitions.
    #[arg(long)]
    pub apply: bool,
}

/// Execute the scan subcommand.
pub async fn run_scan(args: &ScanArgs, config: &AtlasConfig) -> Result<u8> {
    let store = load_events(&args.events)?;
    let engine = build_engine(config, store, clock_at(args.now));

    if !args.apply {
        let candidates = engine.scan_qualifying().await?;
        if candidates.is_empty() {
            println!("OK: nothing due");
        }
        for candidate in &candidates {
            println!(
                "DUE: {} {} -> {} ({})",
                candidate.event_id, candidate.edge.from, candidate.edge.to, candidate.edge.reason
            );
        }
        return Ok(0);
    }

    let report = engine.run_scheduled_scan().await?;
    if !report.applied.is_empty() {
        save_events(&args.events, engine.store())?;
    }

    for entry in &report.applied {
        println!(
            "APPLIED: {} {} -> {} ({} link(s))",
            entry.event_id, entry.edge.from, entry.edge.to, entry.committed
        );
    }
    for entry in &report.skipped {
        println!(
            "SKIPPED: {} {}",
            entry.event_id,
            entry.detail.as_deref().unwrap_or_default()
        );
    }
    for entry in &report.failed {
        println!(
            "FAILED: {} {}",
            entry.event_id,
            entry.detail.as_deref().unwrap_or_default()
        );
    }
    println!(
        "OK: {} applied, {} skipped, {} failed",
        report.applied.len(),
        report.skipped.len(),
        report.failed.len()
    );

    Ok(if report.failed.is_empty() { 0 } else { 1 })
}
