use anyhow::{anyhow, Result};
use queuectl_common::JobState;
use queuectl_queue::Queue;

use crate::commands::table;

/// `list [--state STATE]` (spec §6). An unrecognised `--state` is an
/// input error surfaced immediately with a non-zero exit (spec §7).
pub async fn run(queue: &Queue, state_filter: Option<&str>) -> Result<()> {
    let state = match state_filter {
        Some(raw) => Some(raw.parse::<JobState>().map_err(|_| {
            anyhow!("invalid --state {raw:?}; expected one of pending, processing, completed, dead")
        })?),
        None => None,
    };

    let jobs = queue.list(state, None).await?;
    table::print_jobs(&jobs);
    Ok(())
}
