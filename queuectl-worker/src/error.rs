use thiserror::Error;

/// Errors that can abort a worker process (spec §7: "worker crash" is the
/// only operator-visible failure mode; everything else is absorbed into
/// the job's `error_message` by the retry state machine).
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error(transparent)]
    Queue(#[from] queuectl_queue::QueueError),
    #[error(transparent)]
    Liveness(#[from] queuectl_common::LivenessError),
}
