use queuectl_common::ParseJobStateError;
use thiserror::Error;

/// Errors surfaced by [`crate::SqliteStore`]. Mirrors the
/// variant-per-failure-mode shape of `hook_common::pgqueue::PgQueueError`.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to open store at {path}: {source}")]
    Connection {
        path: String,
        source: sqlx::Error,
    },
    #[error("{command} query failed: {source}")]
    Query {
        command: &'static str,
        source: sqlx::Error,
    },
    #[error("job {0:?} already exists")]
    Conflict(String),
    #[error("job {0:?} does not exist")]
    NotFound(String),
    #[error("job {id:?} must be in state {expected:?} for this operation, but is {found:?}")]
    IllegalTransition {
        id: String,
        expected: &'static str,
        found: String,
    },
    #[error("stored job state is invalid: {0}")]
    CorruptState(#[from] ParseJobStateError),
}
