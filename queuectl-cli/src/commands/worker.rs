use anyhow::{Context, Result};
use queuectl_supervisor::Supervisor;

/// `worker start`: exits 0 once every spawned worker has registered its
/// liveness record (spec §6).
pub async fn start(supervisor: &Supervisor, count: u32, poll_interval_seconds: f64) -> Result<()> {
    let registered = supervisor
        .start(count, poll_interval_seconds)
        .await
        .context("failed to start workers")?;
    for record in &registered {
        println!("started worker {} (pid {})", record.worker_id, record.pid);
    }
    Ok(())
}

/// `worker stop`: exits 0 once every previously-live worker is no longer
/// resident, or the grace period has expired and stragglers were killed.
pub async fn stop(supervisor: &Supervisor) -> Result<()> {
    let stopped = supervisor.stop().await.context("failed to stop workers")?;
    println!("stopped {stopped} worker(s)");
    Ok(())
}
