use chrono::{DateTime, Utc};
use queuectl_common::{Job, JobState};
use sqlx::FromRow;

use crate::error::StoreError;

/// The raw database row. `state` is stored as `TEXT` since SQLite has no
/// native enum type (unlike the teacher's Postgres `job_status` enum);
/// conversion to [`JobState`] happens at the boundary in [`JobRow::into_job`].
#[derive(FromRow)]
pub(crate) struct JobRow {
    pub id: String,
    pub command: String,
    pub state: String,
    pub attempts: i64,
    pub max_retries: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub next_retry_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub claimed_by: Option<String>,
}

impl JobRow {
    pub fn into_job(self) -> Result<Job, StoreError> {
        Ok(Job {
            id: self.id,
            command: self.command,
            state: self.state.parse::<JobState>()?,
            attempts: self.attempts,
            max_retries: self.max_retries,
            created_at: self.created_at,
            updated_at: self.updated_at,
            next_retry_at: self.next_retry_at,
            error_message: self.error_message,
            claimed_by: self.claimed_by,
        })
    }
}
