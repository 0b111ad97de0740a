//! The external CLI surface (spec §6): argument parsing only, grounded on
//! `posthog_cli`'s `commands.rs` (`#[derive(Parser)]`/`#[derive(Subcommand)]`
//! shape). Dispatch lives in `main.rs`, which wires each variant to the
//! `queuectl_queue`/`queuectl_supervisor` domain layers.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "queuectl", version, about = "A single-machine background job queue", long_about = None)]
pub struct Cli {
    /// Path to the SQLite store file.
    #[arg(long, global = true, env = "QUEUECTL_DB_PATH", default_value = "queuectl.db")]
    pub db_path: PathBuf,

    /// Directory holding worker liveness (`.pid`) files.
    #[arg(long, global = true, env = "QUEUECTL_LIVENESS_DIR", default_value = ".")]
    pub liveness_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Submit a shell command for asynchronous execution.
    Enqueue {
        /// A JSON object `{"id"?, "command", "max_retries"?}`, or a bare command string.
        spec: String,
        /// Overrides `max_retries` from the JSON object (or sets it for a bare command).
        #[arg(long)]
        max_retries: Option<i64>,
    },
    /// Manage worker processes.
    Worker {
        #[command(subcommand)]
        cmd: WorkerCommand,
    },
    /// Show queue counts per state and the list of live workers.
    Status {
        /// Run the stuck-job recovery sweep without printing full status.
        #[arg(long)]
        reset_stuck: bool,
        /// Override the persisted `stuck-timeout-seconds` for this invocation only.
        #[arg(long)]
        stuck_timeout: Option<i64>,
    },
    /// List jobs, optionally filtered by state.
    List {
        /// One of pending, processing, completed, dead.
        #[arg(long)]
        state: Option<String>,
    },
    /// Dead-letter queue operations.
    Dlq {
        #[command(subcommand)]
        cmd: DlqCommand,
    },
    /// Read or write persisted configuration.
    Config {
        #[command(subcommand)]
        cmd: ConfigCommand,
    },
}

#[derive(Subcommand)]
pub enum WorkerCommand {
    /// Spawn worker processes, returning once each has registered liveness.
    Start {
        #[arg(long, default_value_t = 1)]
        count: u32,
        /// Overrides the persisted `poll-interval-seconds` for these workers only.
        #[arg(long)]
        poll_interval: Option<f64>,
    },
    /// Signal every live worker to terminate and wait for them to exit.
    Stop,
}

#[derive(Subcommand)]
pub enum DlqCommand {
    /// List jobs currently in the dead-letter queue.
    List,
    /// Revive a dead-lettered job back to `pending`.
    Retry { id: String },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print one config value, or all of them if `--key` is omitted.
    Get {
        #[arg(long)]
        key: Option<String>,
    },
    /// Set and validate a single config value.
    Set { key: String, value: String },
}
