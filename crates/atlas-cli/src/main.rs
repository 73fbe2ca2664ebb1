//! # atlas CLI entry point
//!
//! Parses command-line arguments, sets up logging and dispatches to the
//! subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use atlas_cli::check::run_check_handlers;
use atlas_cli::config::AtlasConfig;
use atlas_cli::graph::{run_graph, GraphArgs};
use atlas_cli::scan::{run_scan, ScanArgs};
use atlas_cli::transition::{run_transition, TransitionArgs};

/// Event lifecycle engine CLI.
///
/// Inspects the lifecycle graph and drives events stored in a JSON file
/// through guarded and automatic transitions.
#[derive(Parser, Debug)]
#[command(name = "atlas", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print states, edges, guards, actions and automatic rules.
    Graph(GraphArgs),

    /// Run one transition and any automatic follow-ups.
    Transition(TransitionArgs),

    /// List or apply due time-based transitions.
    Scan(ScanArgs),

    /// Report actions and validations without an implementation.
    CheckHandlers,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    let result = AtlasConfig::load(cli.config.as_deref()).and_then(|config| run(cli.command, &config));

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: u8, json: bool) {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run(command: Commands, config: &AtlasConfig) -> anyhow::Result<u8> {
    match command {
        Commands::Graph(args) => run_graph(&args, config),
        Commands::CheckHandlers => run_check_handlers(config),
        Commands::Transition(args) => runtime()?.block_on(run_transition(&args, config)),
        Commands::Scan(args) => runtime()?.block_on(run_scan(&args, config)),
    }
}

fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
