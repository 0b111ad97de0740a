//! The `Job` entity and its lifecycle states.
//!
//! Mirrors the shape of `hook_common::pgqueue::Job`, but widened to the
//! four-state machine (`pending`/`processing`/`completed`/`dead`) and the
//! retry-deadline fields this queue's spec requires. Kept free of any
//! storage-layer dependency (no `sqlx`) so it can be shared by the store,
//! queue, worker and CLI crates without pulling in a database driver.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The state a [`Job`] can be in. `failed` is intentionally absent: per
/// spec, a failed-but-retryable job is stored as `Pending` with a future
/// `next_retry_at` rather than getting its own stored state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobState {
    Pending,
    Processing,
    Completed,
    Dead,
}

impl JobState {
    pub const ALL: [JobState; 4] = [
        JobState::Pending,
        JobState::Processing,
        JobState::Completed,
        JobState::Dead,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::Processing => "processing",
            JobState::Completed => "completed",
            JobState::Dead => "dead",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{0:?} is not a valid job state")]
pub struct ParseJobStateError(pub String);

impl FromStr for JobState {
    type Err = ParseJobStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobState::Pending),
            "processing" => Ok(JobState::Processing),
            "completed" => Ok(JobState::Completed),
            "dead" => Ok(JobState::Dead),
            other => Err(ParseJobStateError(other.to_owned())),
        }
    }
}

/// A job as persisted by the Store. Never mutated in place by callers;
/// every field change flows through a Store transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub command: String,
    pub state: JobState,
    pub attempts: i64,
    pub max_retries: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub next_retry_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub claimed_by: Option<String>,
}

/// Parameters accepted by `enqueue`. Either surface syntax from §6
/// (structured JSON object, or a bare command string) deserializes into
/// this via [`EnqueueSpec::from_str`] / [`EnqueueSpec::command_only`].
#[derive(Debug, Clone, Deserialize)]
pub struct EnqueueSpec {
    pub id: Option<String>,
    pub command: String,
    pub max_retries: Option<i64>,
}

#[derive(Debug, thiserror::Error)]
pub enum EnqueueSpecError {
    #[error("invalid enqueue spec: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("enqueue spec is missing a \"command\"")]
    MissingCommand,
}

impl EnqueueSpec {
    /// Parse the `<spec>` CLI argument from §6: either a JSON object with
    /// at least a `command` field, or (if it does not parse as JSON, or
    /// parses as a bare JSON string) a plain command line.
    pub fn parse(raw: &str) -> Result<Self, EnqueueSpecError> {
        let trimmed = raw.trim();
        if trimmed.starts_with('{') {
            let spec: EnqueueSpec = serde_json::from_str(trimmed)?;
            if spec.command.trim().is_empty() {
                return Err(EnqueueSpecError::MissingCommand);
            }
            Ok(spec)
        } else {
            Ok(EnqueueSpec {
                id: None,
                command: raw.to_owned(),
                max_retries: None,
            })
        }
    }
}
