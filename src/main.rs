//! Batch entry point.
//!
//! Loads the task and participant tables, runs one solve, prints the
//! day/participant summary, and writes the assignment CSV. Every flag
//! has a default, so a bare invocation works against the conventional
//! data layout. Failures print a diagnostic and exit non-zero.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use shiftplan::config::PlannerConfig;
use shiftplan::error::PlanError;
use shiftplan::planner::Planner;
use shiftplan::{io, report};

#[derive(Debug, Parser)]
#[command(name = "shiftplan", version, about = "Assign participants to event tasks")]
struct Cli {
    /// Task table (semicolon-delimited CSV).
    #[arg(long, default_value = "data/tasks.csv")]
    tasks: PathBuf,

    /// Participant table (semicolon-delimited CSV).
    #[arg(long, default_value = "data/participants.csv")]
    participants: PathBuf,

    /// Output assignment table (comma-delimited CSV).
    #[arg(long, default_value = "assignments.csv")]
    output: PathBuf,

    /// Optional TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Optional existing assignments to pin into the solution.
    #[arg(long)]
    pinned: Option<PathBuf>,
}

fn run(cli: &Cli) -> Result<(), PlanError> {
    let config = match &cli.config {
        Some(path) => PlannerConfig::from_path(path)?,
        None => PlannerConfig::default(),
    };

    let tasks = io::load_tasks(&cli.tasks)?;
    let participants = io::load_participants(&cli.participants)?;
    let mut planner = Planner::new(tasks, participants, config);
    if let Some(path) = &cli.pinned {
        planner = planner.with_pins(io::load_pins(path)?);
    }

    let roster = planner.solve()?;
    io::write_roster(&cli.output, &roster)?;

    print!("{}", report::render(&roster));
    println!("\nassignments written to {}", cli.output.display());
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
