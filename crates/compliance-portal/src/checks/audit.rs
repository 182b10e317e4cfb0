//! Append-only JSONL audit trail.
//!
//! Every completed check lands as exactly one line. Appends go through a
//! single mutex-guarded handle so concurrent requests never interleave
//! partial lines. A failed append is rolled back to the last full line.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::warn;

use super::domain::AuditEntry;

/// Destination for audit entries.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn append(&self, entry: &AuditEntry) -> Result<(), AuditError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("failed to serialize audit entry: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to open audit log {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to append to audit log: {0}")]
    Write(#[source] io::Error),
}

/// Audit log backed by a line-delimited JSON file opened in append mode.
#[derive(Debug)]
pub struct JsonlAuditLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonlAuditLog {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, AuditError> {
        let path = path.into();
        let open_error = |source| AuditError::Open {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(open_error)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(open_error)?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AuditSink for JsonlAuditLog {
    async fn append(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');

        let mut file = self.file.lock().await;
        let committed = file.metadata().await.map_err(AuditError::Write)?.len();
        if let Err(err) = write_line(&mut file, &line).await {
            truncate_to(&file, committed).await;
            return Err(AuditError::Write(err));
        }
        Ok(())
    }
}

async fn write_line(file: &mut File, line: &[u8]) -> io::Result<()> {
    file.write_all(line).await?;
    file.flush().await?;
    file.sync_data().await
}

/// Drops whatever a failed append left after the last complete line.
async fn truncate_to(file: &File, committed: u64) {
    if let Err(err) = file.set_len(committed).await {
        warn!(error = %err, committed, "failed to roll back partial audit line");
    }
}
