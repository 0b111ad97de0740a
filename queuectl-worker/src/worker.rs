//! The long-lived poll/claim/execute/report loop (spec §4.3).
//!
//! Grounded on `hook_worker::worker::WebhookWorker::{run, wait_for_job,
//! process_webhook_job}`: the same "tick a poll interval, ask the queue
//! for work, process it, report the outcome" shape, with the HTTP call
//! (`send_webhook`) replaced by `tokio::process::Command` child-process
//! execution (grounded on `codex-rs/core/src/spawn.rs`'s
//! `Stdio::piped()`/`kill_on_drop(true)` shape, since the teacher's
//! workers never exec a shell).

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use queuectl_common::{Job, WorkerRecord};
use queuectl_queue::{Outcome, Queue};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::error::WorkerError;

/// Fixed process-wide execution ceiling (spec §4.3 step 2, §1 Non-goals:
/// no per-job timeout configuration beyond this single fixed value).
const EXECUTION_CEILING: Duration = Duration::from_secs(60 * 60);

/// Bounded length of the captured stderr-tail error snippet (spec §1
/// Non-goals: never the full process output).
const ERROR_SNIPPET_LIMIT: usize = 1024;

/// A single worker's poll/claim/execute/report loop, identified by a
/// stable `worker_id` distinct from its OS pid (spec glossary).
pub struct Worker {
    worker_id: String,
    queue: Queue,
    liveness_dir: PathBuf,
    poll_interval: Duration,
    execution_ceiling: Duration,
    shutdown: Arc<AtomicBool>,
}

impl Worker {
    pub fn new(
        worker_id: String,
        queue: Queue,
        liveness_dir: PathBuf,
        poll_interval_seconds: f64,
    ) -> Self {
        Self {
            worker_id,
            queue,
            liveness_dir,
            poll_interval: Duration::from_secs_f64(poll_interval_seconds.max(0.001)),
            execution_ceiling: EXECUTION_CEILING,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Narrow the execution ceiling below the spec's one-hour default.
    /// Only meaningful for exercising the timeout branch in tests without
    /// waiting an hour.
    #[cfg(test)]
    fn with_execution_ceiling(mut self, ceiling: Duration) -> Self {
        self.execution_ceiling = ceiling;
        self
    }

    /// Install SIGTERM/SIGINT handlers that flip the shutdown flag,
    /// checked cooperatively between poll iterations (spec §4.3 step 5,
    /// §5 "non-preemptive... but followed by a final report").
    pub fn install_signal_handlers(&self) {
        let flag = self.shutdown.clone();
        tokio::spawn(async move {
            let mut term = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            {
                Ok(signal) => signal,
                Err(error) => {
                    warn!(%error, "failed to install SIGTERM handler");
                    return;
                }
            };
            term.recv().await;
            info!("received SIGTERM, finishing current job before exit");
            flag.store(true, Ordering::SeqCst);
        });

        let flag = self.shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("received SIGINT, finishing current job before exit");
                flag.store(true, Ordering::SeqCst);
            }
        });
    }

    /// Run until a shutdown signal is observed between iterations. Writes
    /// a liveness record on entry and removes it on the way out, even on
    /// error (spec §4.3 steps 1 and 5).
    pub async fn run(&self) -> Result<(), WorkerError> {
        let record = WorkerRecord::new(self.worker_id.clone(), std::process::id(), Utc::now());
        record.write(&self.liveness_dir)?;
        info!(worker_id = %self.worker_id, pid = record.pid, "worker started");

        let result = self.poll_loop().await;

        WorkerRecord::remove(&self.liveness_dir, &self.worker_id)?;
        info!(worker_id = %self.worker_id, "worker stopped");
        result
    }

    async fn poll_loop(&self) -> Result<(), WorkerError> {
        loop {
            if self.shutdown.load(Ordering::SeqCst) {
                return Ok(());
            }

            match self.queue.claim(&self.worker_id).await? {
                Some(job) => self.execute_and_report(job).await?,
                None => tokio::time::sleep(self.poll_interval).await,
            }
        }
    }

    /// Strict one-job-at-a-time: no further claim happens until this
    /// job's outcome has been reported (spec §4.3 step 4).
    async fn execute_and_report(&self, job: Job) -> Result<(), WorkerError> {
        info!(job_id = %job.id, command = %job.command, "claimed job");
        let outcome = self.run_command(&job.command).await;
        match &outcome {
            Outcome::Success => info!(job_id = %job.id, "job succeeded"),
            Outcome::Failure { error } => warn!(job_id = %job.id, %error, "job failed"),
        }
        self.queue.report(&job, outcome).await?;
        Ok(())
    }

    /// Execute `command` through the OS shell. `kill_on_drop(true)` means
    /// that if the `timeout` future below is dropped on elapse, the still
    /// in-flight `Child` is killed as part of unwinding — this is how the
    /// one-hour ceiling (spec §4.3 step 2) is enforced without a separate
    /// watchdog task.
    async fn run_command(&self, command: &str) -> Outcome {
        let child = match Command::new("/bin/sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(error) => {
                return Outcome::Failure {
                    error: format!("failed to spawn command: {error}"),
                };
            }
        };

        match timeout(self.execution_ceiling, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                if output.status.success() {
                    Outcome::Success
                } else {
                    Outcome::Failure {
                        error: error_snippet(&output.stderr, &output.status),
                    }
                }
            }
            Ok(Err(error)) => Outcome::Failure {
                error: format!("failed to run command: {error}"),
            },
            Err(_) => Outcome::Failure {
                error: "execution-timeout".to_owned(),
            },
        }
    }
}

/// Bounded-length tail of the child's stderr, never the full buffer (spec
/// §1 Non-goals). Falls back to the exit status when stderr is empty.
fn error_snippet(stderr: &[u8], status: &std::process::ExitStatus) -> String {
    let tail_len = stderr.len().min(ERROR_SNIPPET_LIMIT);
    let tail = &stderr[stderr.len() - tail_len..];
    let text = String::from_utf8_lossy(tail).trim().to_string();
    if text.is_empty() {
        return format!("command exited with {status}");
    }
    if stderr.len() > ERROR_SNIPPET_LIMIT {
        format!("...truncated\n{text}")
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use queuectl_store::SqliteStore;

    async fn temp_worker(worker_id: &str) -> (tempfile::TempDir, Worker) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::new(&dir.path().join("queuectl.db"))
            .await
            .unwrap();
        let queue = Queue::new(store);
        let worker = Worker::new(worker_id.to_owned(), queue, dir.path().to_path_buf(), 0.01);
        (dir, worker)
    }

    #[tokio::test]
    async fn run_command_true_succeeds() {
        let (_dir, worker) = temp_worker("w1").await;
        assert!(matches!(worker.run_command("/bin/true").await, Outcome::Success));
    }

    #[tokio::test]
    async fn run_command_false_fails_with_exit_status() {
        let (_dir, worker) = temp_worker("w1").await;
        match worker.run_command("/bin/false").await {
            Outcome::Failure { error } => assert!(error.contains("exited")),
            Outcome::Success => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn run_command_captures_stderr_tail() {
        let (_dir, worker) = temp_worker("w1").await;
        match worker
            .run_command("echo something-went-wrong 1>&2; exit 1")
            .await
        {
            Outcome::Failure { error } => assert!(error.contains("something-went-wrong")),
            Outcome::Success => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn run_command_enforces_execution_ceiling() {
        let (_dir, worker) = temp_worker("w1").await;
        let worker = worker.with_execution_ceiling(Duration::from_millis(50));
        match worker.run_command("sleep 5").await {
            Outcome::Failure { error } => assert_eq!(error, "execution-timeout"),
            Outcome::Success => panic!("expected timeout failure"),
        }
    }

    #[tokio::test]
    async fn execute_and_report_completes_job_on_success() {
        let (_dir, worker) = temp_worker("w1").await;
        let job = worker.queue.enqueue("/bin/true").await.unwrap();
        let claimed = worker.queue.claim("w1").await.unwrap().unwrap();
        assert_eq!(claimed.id, job.id);

        worker.execute_and_report(claimed).await.unwrap();
        let reloaded = worker.queue.get(&job.id).await.unwrap().unwrap();
        assert_eq!(reloaded.state, queuectl_common::JobState::Completed);
        assert_eq!(reloaded.attempts, 1);
    }

    #[tokio::test]
    async fn poll_loop_returns_immediately_once_shutdown_is_requested() {
        let (_dir, worker) = temp_worker("w1").await;
        worker.shutdown.store(true, Ordering::SeqCst);
        worker.poll_loop().await.unwrap();
    }
}
