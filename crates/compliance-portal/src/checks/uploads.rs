use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::warn;
use uuid::Uuid;

use super::domain::{Attachment, UploadedFile};

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("failed to prepare upload directory {}: {source}", dir.display())]
    Directory {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to stage upload {stored_as}: {source}")]
    Write {
        stored_as: String,
        #[source]
        source: io::Error,
    },
}

/// Staging area for files attached to a check.
///
/// Files referenced by an audit entry are kept; files belonging to a check
/// that failed afterwards are discarded by the service.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn stage(&self, file: &UploadedFile) -> Result<Attachment, UploadError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| UploadError::Directory {
                dir: self.dir.clone(),
                source,
            })?;

        let stored_as = stored_name(file.file_name.as_deref());
        fs::write(self.dir.join(&stored_as), &file.bytes)
            .await
            .map_err(|source| UploadError::Write {
                stored_as: stored_as.clone(),
                source,
            })?;

        let original_name = file
            .file_name
            .clone()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| stored_as.clone());

        Ok(Attachment {
            original_name,
            stored_as,
            size: file.bytes.len() as u64,
            content_type: file
                .content_type
                .clone()
                .filter(|value| !value.trim().is_empty()),
        })
    }

    /// Best-effort removal of a staged file.
    pub async fn discard(&self, attachment: &Attachment) {
        let path = self.dir.join(&attachment.stored_as);
        if let Err(err) = fs::remove_file(&path).await {
            warn!(stored_as = %attachment.stored_as, error = %err, "failed to discard staged upload");
        }
    }
}

fn stored_name(original: Option<&str>) -> String {
    let id = Uuid::new_v4().simple().to_string();
    let extension = original
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .filter(|ext| !ext.is_empty());

    match extension {
        Some(ext) => format!("{id}.{}", ext.to_ascii_lowercase()),
        None => id,
    }
}
