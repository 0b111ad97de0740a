use anyhow::{bail, Context, Result};
use queuectl_queue::{Queue, QueueError};

use crate::commands::table;

/// `dlq list`: same columns as `list`, state fixed to `dead` (spec §6).
pub async fn list(queue: &Queue) -> Result<()> {
    let jobs = queue
        .dlq_list()
        .await
        .context("failed to list dead-letter jobs")?;
    table::print_jobs(&jobs);
    Ok(())
}

/// `dlq retry <id>`: distinguishes "no such job" from "job exists but
/// isn't dead" per spec §7's `NotFound` vs `NotInDLQ` taxonomy.
pub async fn retry(queue: &Queue, id: &str) -> Result<()> {
    match queue.dlq_retry(id).await {
        Ok(()) => {
            println!("revived {id}");
            Ok(())
        }
        Err(QueueError::NotFound(id)) => bail!("job {id:?} does not exist"),
        Err(QueueError::NotInDlq(id)) => bail!("job {id:?} is not in the dead-letter queue"),
        Err(other) => Err(other.into()),
    }
}
