//! Hand-aligned column printing for `list`/`dlq list` output (spec §6).
//! Bespoke: no crate in the retrieved pack specializes in rendering a
//! job-queue-shaped table, and spec.md explicitly scopes the CLI table
//! formatter out as "interfaces only".

use queuectl_common::Job;

pub fn print_jobs(jobs: &[Job]) {
    println!(
        "{:<36} {:<10} {:>8} {:>11} {:<25} {}",
        "ID", "STATE", "ATTEMPTS", "MAX_RETRIES", "CREATED_AT", "ERROR"
    );
    for job in jobs {
        println!(
            "{:<36} {:<10} {:>8} {:>11} {:<25} {}",
            job.id,
            job.state,
            job.attempts,
            job.max_retries,
            job.created_at.to_rfc3339(),
            job.error_message.as_deref().unwrap_or(""),
        );
    }
}
