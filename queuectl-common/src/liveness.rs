//! Filesystem-resident worker liveness records (spec §3 "Worker record",
//! §4.4, §6).
//!
//! Deliberately *not* backed by the Store: spec.md §9 is explicit that
//! liveness must stay observable even if the Store is momentarily locked.
//! This plays the same role `hook_common::health::HealthRegistry` plays
//! for the teacher's long-lived services, but realized as a plain file
//! per worker instead of an in-process registry served over HTTP, since
//! queuectl workers are separate OS processes the Supervisor inspects
//! from the outside rather than a single process reporting on itself.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const LIVENESS_FILE_PREFIX: &str = "queuectl_worker_";
pub const LIVENESS_FILE_SUFFIX: &str = ".pid";

/// The contents of a single worker's liveness file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkerRecord {
    pub worker_id: String,
    pub pid: u32,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum LivenessError {
    #[error("io error accessing liveness file: {0}")]
    Io(#[from] io::Error),
    #[error("malformed liveness file: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub fn liveness_file_path(dir: &Path, worker_id: &str) -> PathBuf {
    dir.join(format!(
        "{LIVENESS_FILE_PREFIX}{worker_id}{LIVENESS_FILE_SUFFIX}"
    ))
}

impl WorkerRecord {
    pub fn new(worker_id: String, pid: u32, started_at: DateTime<Utc>) -> Self {
        Self {
            worker_id,
            pid,
            started_at,
        }
    }

    /// Write this record to `dir`, creating or truncating its file.
    /// Each worker owns exactly one file, so concurrent writers never
    /// race on the same path (spec §5).
    pub fn write(&self, dir: &Path) -> Result<(), LivenessError> {
        fs::create_dir_all(dir)?;
        let path = liveness_file_path(dir, &self.worker_id);
        let body = serde_json::to_string_pretty(self)?;
        fs::write(path, body)?;
        Ok(())
    }

    pub fn remove(dir: &Path, worker_id: &str) -> Result<(), LivenessError> {
        let path = liveness_file_path(dir, worker_id);
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn read(path: &Path) -> Result<Self, LivenessError> {
        let body = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Enumerate every liveness record found directly under `dir`.
/// Unparseable files are skipped with a warning rather than failing the
/// whole scan, since `status` must remain usable even if a file was
/// partially written during a crash.
pub fn list_records(dir: &Path) -> Result<Vec<WorkerRecord>, LivenessError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut records = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !name.starts_with(LIVENESS_FILE_PREFIX) || !name.ends_with(LIVENESS_FILE_SUFFIX) {
            continue;
        }
        match WorkerRecord::read(&path) {
            Ok(record) => records.push(record),
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "skipping malformed liveness file");
            }
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let record = WorkerRecord::new("w1".to_owned(), 4242, Utc::now());
        record.write(dir.path()).unwrap();

        let path = liveness_file_path(dir.path(), "w1");
        let read_back = WorkerRecord::read(&path).unwrap();
        assert_eq!(read_back, record);
    }

    #[test]
    fn list_records_finds_only_liveness_files() {
        let dir = tempfile::tempdir().unwrap();
        WorkerRecord::new("w1".to_owned(), 1, Utc::now())
            .write(dir.path())
            .unwrap();
        WorkerRecord::new("w2".to_owned(), 2, Utc::now())
            .write(dir.path())
            .unwrap();
        fs::write(dir.path().join("queuectl.db"), "not a liveness file").unwrap();

        let mut records = list_records(dir.path()).unwrap();
        records.sort_by(|a, b| a.worker_id.cmp(&b.worker_id));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].worker_id, "w1");
        assert_eq!(records[1].worker_id, "w2");
    }

    #[test]
    fn remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        WorkerRecord::remove(dir.path(), "ghost").unwrap();
    }

    #[test]
    fn list_records_on_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        assert!(list_records(&missing).unwrap().is_empty());
    }
}
