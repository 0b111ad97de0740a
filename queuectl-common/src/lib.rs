//! Shared data model for queuectl: the `Job`/`JobState` entity, persisted
//! `Config`, backoff math, and filesystem-resident worker liveness
//! records. Free of any storage-layer dependency so it can be used by
//! the store, queue, worker, supervisor and CLI crates alike.

pub mod config;
pub mod job;
pub mod liveness;
pub mod retry;

pub use config::{ConfigKey, InvalidConfigValue, ResolvedConfig, UnknownConfigKey};
pub use job::{EnqueueSpec, EnqueueSpecError, Job, JobState, ParseJobStateError};
pub use liveness::{LivenessError, WorkerRecord};
pub use retry::{backoff_delay, backoff_delay_seconds};
