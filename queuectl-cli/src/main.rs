//! `queuectl`: the operator-facing CLI (spec §6). Parses with `clap`'s
//! derive API, dispatches into `queuectl_queue`/`queuectl_supervisor`, and
//! converts every error into the one-line-diagnostic + non-zero-exit
//! policy spec §7 requires — grounded on `posthog_cli`'s `main.rs`/
//! `CapturedError` boundary.
mod cli;
mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, ConfigCommand, DlqCommand, WorkerCommand};
use queuectl_queue::Queue;
use queuectl_store::SqliteStore;
use queuectl_supervisor::Supervisor;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(tracing::Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    if let Err(error) = run().await {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let store = SqliteStore::new(&cli.db_path).await?;
    let queue = Queue::new(store);
    let supervisor = Supervisor::new(
        cli.liveness_dir.clone(),
        worker_binary_path(),
        cli.db_path.clone(),
    );

    match cli.command {
        Commands::Enqueue { spec, max_retries } => {
            commands::enqueue::run(&queue, &spec, max_retries).await
        }
        Commands::Worker { cmd } => match cmd {
            WorkerCommand::Start { count, poll_interval } => {
                let poll_interval = match poll_interval {
                    Some(value) => value,
                    None => queue.resolved_config().await?.poll_interval_seconds,
                };
                commands::worker::start(&supervisor, count, poll_interval).await
            }
            WorkerCommand::Stop => commands::worker::stop(&supervisor).await,
        },
        Commands::Status { reset_stuck, stuck_timeout } => {
            let resolved = queue.resolved_config().await?;
            let stuck_timeout_seconds = stuck_timeout.unwrap_or(resolved.stuck_timeout_seconds);
            if reset_stuck {
                let recovered = supervisor
                    .reset_stuck(&queue, stuck_timeout_seconds, resolved.backoff_base)
                    .await?;
                println!("recovered {} stuck job(s)", recovered.len());
                Ok(())
            } else {
                commands::status::run(&supervisor, &queue, stuck_timeout_seconds, resolved.backoff_base).await
            }
        }
        Commands::List { state } => commands::list::run(&queue, state.as_deref()).await,
        Commands::Dlq { cmd } => match cmd {
            DlqCommand::List => commands::dlq::list(&queue).await,
            DlqCommand::Retry { id } => commands::dlq::retry(&queue, &id).await,
        },
        Commands::Config { cmd } => match cmd {
            ConfigCommand::Get { key } => commands::config::get(queue.store(), key.as_deref()).await,
            ConfigCommand::Set { key, value } => {
                commands::config::set(queue.store(), &key, &value).await
            }
        },
    }
}

/// Resolve the worker binary next to this one, falling back to `$PATH`
/// lookup (spec §9: "`current_exe` or `queuectl-worker`").
fn worker_binary_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("queuectl-worker")))
        .unwrap_or_else(|| PathBuf::from("queuectl-worker"))
}
