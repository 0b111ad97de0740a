use anyhow::{Context, Result};
use queuectl_queue::Queue;

/// Submit `spec` (either JSON object or bare command string, spec §6) for
/// execution. `--max-retries` overrides/sets the field on top of whatever
/// surface syntax was used.
pub async fn run(queue: &Queue, spec: &str, max_retries: Option<i64>) -> Result<()> {
    let raw = match max_retries {
        Some(max_retries) => merge_max_retries(spec, max_retries)?,
        None => spec.to_owned(),
    };

    let job = queue.enqueue(&raw).await.context("failed to enqueue job")?;
    println!("{}", job.id);
    Ok(())
}

fn merge_max_retries(spec: &str, max_retries: i64) -> Result<String> {
    let trimmed = spec.trim();
    if trimmed.starts_with('{') {
        let mut value: serde_json::Value =
            serde_json::from_str(trimmed).context("invalid enqueue JSON")?;
        value["max_retries"] = serde_json::json!(max_retries);
        Ok(value.to_string())
    } else {
        Ok(serde_json::json!({ "command": spec, "max_retries": max_retries }).to_string())
    }
}
