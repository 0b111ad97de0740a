//! Process bootstrap configuration for the worker binary (spec §1.1):
//! read once at startup from the environment via `envconfig`, mirroring
//! `hook_worker::config::Config`. The Supervisor sets these variables when
//! it spawns a worker (spec §4.4); a worker started by hand for debugging
//! picks up the same defaults `queuectl` itself uses.
//!
//! Distinct from the persisted tunables in `queuectl_common::config`,
//! which live in the Store and can be changed at runtime via `config set`
//! without restarting any worker.

use envconfig::Envconfig;

#[derive(Envconfig, Clone, Debug)]
pub struct Config {
    /// Stable identity distinct from the OS pid (spec glossary "Worker id").
    #[envconfig(from = "QUEUECTL_WORKER_ID")]
    pub worker_id: String,

    #[envconfig(from = "QUEUECTL_DB_PATH", default = "queuectl.db")]
    pub db_path: String,

    #[envconfig(from = "QUEUECTL_LIVENESS_DIR", default = ".")]
    pub liveness_dir: String,

    #[envconfig(from = "QUEUECTL_POLL_INTERVAL_SECONDS", default = "1.0")]
    pub poll_interval_seconds: f64,
}
