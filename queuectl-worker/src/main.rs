//! Consume `queuectl` jobs: poll, claim, execute as a shell command,
//! report back (spec §4.3). Spawned by `queuectl worker start`, never run
//! directly by an operator; all configuration arrives via the environment
//! (spec §1.1), mirroring `hook_worker`'s envconfig-only startup.
use envconfig::Envconfig;
use queuectl_queue::Queue;
use queuectl_store::SqliteStore;
use queuectl_worker::config::Config;
use queuectl_worker::error::WorkerError;
use queuectl_worker::worker::Worker;

#[tokio::main]
async fn main() -> Result<(), WorkerError> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(tracing::Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let config = Config::init_from_env().expect("invalid worker configuration");

    let store = SqliteStore::new(std::path::Path::new(&config.db_path))
        .await
        .expect("failed to open store");
    let queue = Queue::new(store);

    let worker = Worker::new(
        config.worker_id.clone(),
        queue,
        std::path::PathBuf::from(&config.liveness_dir),
        config.poll_interval_seconds,
    );
    worker.install_signal_handlers();
    worker.run().await
}
