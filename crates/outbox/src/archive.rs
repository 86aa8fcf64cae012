//! Record archive.
//!
//! Every accepted record lands here regardless of what happens downstream,
//! so the dashboard and export endpoint always see the full history. An
//! optional JSON-lines file mirrors the archive for post-mortem inspection.

use parking_lot::RwLock;
use relay_core::{Error, Record};
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use telemetry::metrics;

struct Mirror {
    path: PathBuf,
    file: Mutex<File>,
}

/// Append-only list of accepted records, in acceptance order.
pub struct RecordArchive {
    records: RwLock<Vec<Record>>,
    mirror: Option<Mirror>,
}

impl RecordArchive {
    /// Archive held in memory only.
    pub fn in_memory() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            mirror: None,
        }
    }

    /// Archive with a JSON-lines mirror at `path`, created if missing.
    pub async fn open(path: impl AsRef<Path>) -> relay_core::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| Error::storage(format!("cannot open archive file {}: {}", path.display(), e)))?;

        debug!(path = %path.display(), "Archive mirror opened");

        Ok(Self {
            records: RwLock::new(Vec::new()),
            mirror: Some(Mirror {
                path,
                file: Mutex::new(file),
            }),
        })
    }

    /// Record a batch of accepted records.
    ///
    /// The in-memory copy always succeeds. Mirror write failures are logged
    /// and counted but do not fail the upload. With a mirror, the file lock
    /// is taken before the in-memory update so both see batches in the same
    /// order.
    pub async fn extend(&self, batch: &[Record]) {
        if batch.is_empty() {
            return;
        }

        let Some(ref mirror) = self.mirror else {
            self.records.write().extend_from_slice(batch);
            return;
        };

        let mut lines = Vec::new();
        for record in batch {
            match serde_json::to_vec(record) {
                Ok(mut line) => {
                    line.push(b'\n');
                    lines.extend_from_slice(&line);
                }
                Err(e) => warn!(id = %record.id, error = %e, "Failed to serialize record for archive"),
            }
        }

        let mut file = mirror.file.lock().await;
        self.records.write().extend_from_slice(batch);

        let result = match file.write_all(&lines).await {
            Ok(()) => file.flush().await,
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            metrics().archive_write_errors.inc();
            warn!(path = %mirror.path.display(), error = %e, "Archive mirror write failed");
        }
    }

    /// All records in acceptance order.
    pub fn all(&self) -> Vec<Record> {
        self.records.read().clone()
    }

    /// All records, most recently accepted first.
    pub fn newest_first(&self) -> Vec<Record> {
        self.records.read().iter().rev().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    pub fn mirror_path(&self) -> Option<&Path> {
        self.mirror.as_ref().map(|m| m.path.as_path())
    }
}
