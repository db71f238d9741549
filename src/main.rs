//! metronome - run commands on fixed intervals.
//!
//! Usage:
//!   metronome run <schedule.yaml>       Run every task in the schedule until Ctrl+C
//!   metronome validate <schedule.yaml>  Validate a schedule without running it

use clap::{Parser, Subcommand};
use metronome::{Scheduler, TaskStats, YamlLoader, counting, logging};
use std::path::PathBuf;
use tracing::{error, info};

/// metronome - a minimal periodic task runner
#[derive(Parser)]
#[command(name = "metronome")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every task in a schedule file until interrupted
    Run {
        /// Path to the YAML schedule file
        #[arg(value_name = "FILE")]
        schedule: PathBuf,
    },

    /// Validate a schedule file without running it
    Validate {
        /// Path to the YAML schedule file
        #[arg(value_name = "FILE")]
        schedule: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { schedule } => run_schedule(schedule).await?,
        Commands::Validate { schedule } => validate_schedule(schedule)?,
    }

    Ok(())
}

/// Run all tasks from a schedule file until Ctrl+C.
async fn run_schedule(path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    info!("Loading schedule from: {}", path.display());
    let schedule = YamlLoader::load(&path)?;

    let stats = TaskStats::new();
    let mut scheduler = Scheduler::with_middlewares([logging(), counting(stats.clone())]);
    for task in &schedule.tasks {
        info!(
            "  - {} every {:?} (deadline: {:?}): {} {}",
            task.name,
            task.interval(),
            task.deadline(),
            task.command,
            task.args.join(" ")
        );
        scheduler.register_task(task.to_task_config())?;
    }

    info!("Starting {} task(s), press Ctrl+C to stop", scheduler.len());
    let (handle, mut running) = scheduler.spawn();

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down...");
            handle.stop().await;
            running.await??;
        }
        result = &mut running => {
            result??;
        }
    }

    let totals = stats.snapshot();
    info!(
        "Ran {} invocation(s): {} succeeded, {} failed, {} exceeded their deadline",
        totals.invocations, totals.successes, totals.failures, totals.deadline_exceeded
    );
    Ok(())
}

/// Validate a schedule file without running it.
fn validate_schedule(path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    info!("Validating schedule: {}", path.display());

    match YamlLoader::load(&path) {
        Ok(schedule) => {
            info!("All {} task(s) are valid:", schedule.tasks.len());
            for task in &schedule.tasks {
                info!("  - {}: OK", task.name);
            }
            Ok(())
        }
        Err(e) => {
            error!("Validation failed: {}", e);
            Err(e.into())
        }
    }
}
