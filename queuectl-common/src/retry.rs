//! Backoff math for the retry/DLQ state machine (spec §4.2).
//!
//! Generalizes `hook_common::retry::RetryPolicy::time_until_next_retry`,
//! narrowed to the exact formula spec.md §4.2 specifies:
//! `delay = backoff_base ^ (attempts + 1)` seconds, with no jitter, cap,
//! or `Retry-After`-style override (the teacher's policy supports those
//! because it negotiates with external HTTP services; this queue runs
//! a local shell command and has no such signal to honor).

use chrono::Duration;

/// Seconds to wait before a job becomes eligible again. `exponent` is
/// `attempts + 1` using the job's `attempts` count *before* this failure
/// was recorded, per spec.md §4.2's `report` operation.
pub fn backoff_delay_seconds(backoff_base: i64, exponent: i64) -> i64 {
    backoff_base.saturating_pow(exponent.max(0) as u32)
}

pub fn backoff_delay(backoff_base: i64, exponent: i64) -> Duration {
    Duration::seconds(backoff_delay_seconds(backoff_base, exponent))
}
