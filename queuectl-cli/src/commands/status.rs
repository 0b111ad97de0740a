use anyhow::{Context, Result};
use queuectl_queue::Queue;
use queuectl_supervisor::Supervisor;

/// `status`: runs the stuck-job sweep, then prints counts per state and
/// the live worker table. See DESIGN.md for the `--reset-stuck` /
/// `--stuck-timeout` open-question resolution.
pub async fn run(
    supervisor: &Supervisor,
    queue: &Queue,
    stuck_timeout_seconds: i64,
    backoff_base: i64,
) -> Result<()> {
    let status = supervisor
        .status(queue, stuck_timeout_seconds, backoff_base)
        .await
        .context("failed to read status")?;

    println!("pending:    {}", status.counts.pending);
    println!("processing: {}", status.counts.processing);
    println!("completed:  {}", status.counts.completed);
    println!("dead:       {}", status.counts.dead);
    println!();

    if status.workers.is_empty() {
        println!("no live workers");
    } else {
        println!("{:<36} {:<10} {}", "WORKER_ID", "PID", "STARTED_AT");
        for worker in &status.workers {
            println!(
                "{:<36} {:<10} {}",
                worker.worker_id,
                worker.pid,
                worker.started_at.to_rfc3339()
            );
        }
    }
    Ok(())
}
