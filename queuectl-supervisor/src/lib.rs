//! # Supervisor
//!
//! Spawns and tracks worker processes via on-disk liveness records (spec
//! §4.4). There is no teacher analogue for OS process supervision in the
//! pgqueue/hook-worker subsystem — that stack runs inside a single
//! always-on service and never forks siblings — so this module is
//! grounded on `codex-rs`'s process handling instead: `kill_on_drop`
//! semantics from `core/src/spawn.rs` (inverted here, since workers must
//! *outlive* the supervisor that spawned them) and `nix`-based signaling.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use chrono::Utc;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use queuectl_common::liveness::{self, LivenessError, WorkerRecord};
use queuectl_queue::{Queue, QueueError};
use thiserror::Error;
use tokio::process::Command;
use tokio::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

pub type SupervisorResult<T> = Result<T, SupervisorError>;

#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error("failed to spawn worker process: {0}")]
    Spawn(#[source] std::io::Error),
    #[error(transparent)]
    Liveness(#[from] LivenessError),
    #[error(transparent)]
    Queue(#[from] QueueError),
    #[error("only {registered} of {expected} workers registered liveness within the startup window")]
    StartTimedOut { expected: usize, registered: usize },
}

/// Aggregate view returned by [`Supervisor::status`].
#[derive(Debug)]
pub struct Status {
    pub counts: queuectl_store::Counts,
    pub workers: Vec<WorkerRecord>,
}

const START_WAIT: Duration = Duration::from_secs(10);
const START_POLL: Duration = Duration::from_millis(50);
const STOP_GRACE: Duration = Duration::from_secs(30);
const STOP_POLL: Duration = Duration::from_millis(200);

/// Coordinates worker process lifecycle: `start`, `stop`, `status`, and
/// the stuck-job recovery sweep.
pub struct Supervisor {
    liveness_dir: PathBuf,
    worker_binary: PathBuf,
    db_path: PathBuf,
}

impl Supervisor {
    pub fn new(liveness_dir: PathBuf, worker_binary: PathBuf, db_path: PathBuf) -> Self {
        Self {
            liveness_dir,
            worker_binary,
            db_path,
        }
    }

    /// Spawn `count` worker processes and block until each has written its
    /// liveness record, or until the bounded startup window elapses.
    pub async fn start(&self, count: u32, poll_interval_seconds: f64) -> SupervisorResult<Vec<WorkerRecord>> {
        let mut worker_ids = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let worker_id = Uuid::new_v4().to_string();
            // Bootstrap config is handed to the worker entirely through the
            // environment, mirroring `hook_worker`'s envconfig-only startup
            // (it takes no CLI flags at all) rather than hand-rolled argv.
            Command::new(&self.worker_binary)
                .env("QUEUECTL_WORKER_ID", &worker_id)
                .env("QUEUECTL_DB_PATH", &self.db_path)
                .env("QUEUECTL_LIVENESS_DIR", &self.liveness_dir)
                .env("QUEUECTL_POLL_INTERVAL_SECONDS", poll_interval_seconds.to_string())
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()
                .map_err(SupervisorError::Spawn)?;
            info!(worker_id = %worker_id, "spawned worker process");
            worker_ids.push(worker_id);
        }

        let deadline = Instant::now() + START_WAIT;
        loop {
            let registered: Vec<WorkerRecord> = worker_ids
                .iter()
                .filter_map(|id| {
                    WorkerRecord::read(&liveness::liveness_file_path(&self.liveness_dir, id)).ok()
                })
                .collect();
            if registered.len() == worker_ids.len() {
                info!(count = registered.len(), "all workers registered liveness");
                return Ok(registered);
            }
            if Instant::now() >= deadline {
                warn!(
                    expected = worker_ids.len(),
                    registered = registered.len(),
                    "timed out waiting for workers to register liveness"
                );
                return Err(SupervisorError::StartTimedOut {
                    expected: worker_ids.len(),
                    registered: registered.len(),
                });
            }
            tokio::time::sleep(START_POLL).await;
        }
    }

    /// Signal every live worker to terminate, wait up to a bounded grace
    /// period, then forcibly kill stragglers. Always clears out liveness
    /// records for workers that were signalled, whether they exited
    /// cleanly or were escalated against.
    pub async fn stop(&self) -> SupervisorResult<usize> {
        let records = liveness::list_records(&self.liveness_dir)?;
        for record in &records {
            info!(worker_id = %record.worker_id, pid = record.pid, "sending SIGTERM to worker");
            let _ = signal::kill(Pid::from_raw(record.pid as i32), Signal::SIGTERM);
        }

        let deadline = Instant::now() + STOP_GRACE;
        let mut remaining: Vec<&WorkerRecord> = records.iter().collect();
        while !remaining.is_empty() && Instant::now() < deadline {
            tokio::time::sleep(STOP_POLL).await;
            remaining.retain(|record| is_resident(record.pid));
        }
        for record in &remaining {
            warn!(worker_id = %record.worker_id, pid = record.pid, "worker did not exit within grace period, sending SIGKILL");
            let _ = signal::kill(Pid::from_raw(record.pid as i32), Signal::SIGKILL);
        }

        for record in &records {
            WorkerRecord::remove(&self.liveness_dir, &record.worker_id)?;
        }
        info!(count = records.len(), "stopped workers");
        Ok(records.len())
    }

    /// Aggregate queue counts and live worker records, garbage-collecting
    /// any liveness record whose PID is no longer resident, and running
    /// the stuck-job sweep first so the reported counts reflect recovery.
    pub async fn status(
        &self,
        queue: &Queue,
        stuck_timeout_seconds: i64,
        backoff_base: i64,
    ) -> SupervisorResult<Status> {
        self.reset_stuck(queue, stuck_timeout_seconds, backoff_base)
            .await?;

        let records = liveness::list_records(&self.liveness_dir)?;
        let mut live = Vec::with_capacity(records.len());
        for record in records {
            if is_resident(record.pid) {
                live.push(record);
            } else {
                WorkerRecord::remove(&self.liveness_dir, &record.worker_id)?;
            }
        }

        let counts = queue.counts_by_state().await?;
        Ok(Status {
            counts,
            workers: live,
        })
    }

    /// Recover jobs stuck in `processing` since before the stuck-timeout
    /// threshold. Exposed separately so it can be invoked explicitly
    /// (`status --reset-stuck`) as well as implicitly on every `status`
    /// call, per spec §9's open-question resolution.
    pub async fn reset_stuck(
        &self,
        queue: &Queue,
        stuck_timeout_seconds: i64,
        backoff_base: i64,
    ) -> SupervisorResult<Vec<String>> {
        let now = Utc::now();
        let older_than = now - chrono::Duration::seconds(stuck_timeout_seconds);
        let recovered = queue
            .store()
            .reset_stuck(older_than, now, backoff_base)
            .await?;
        if !recovered.is_empty() {
            warn!(count = recovered.len(), ids = ?recovered, "recovered stuck jobs");
        }
        Ok(recovered)
    }
}

/// Probe whether `pid` is still resident in the OS process table, via a
/// signal-0 `kill` (sends no signal, only checks existence/permission).
fn is_resident(pid: u32) -> bool {
    signal::kill(Pid::from_raw(pid as i32), None).is_ok()
}
