use std::path::{Path, PathBuf};

use axum::body::Bytes;
use uuid::Uuid;

use crate::AppResult;

const MAX_EXTENSION_LEN: usize = 10;

/// File received in the `file` field of a multipart request
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub original_name: Option<String>,
    pub bytes: Bytes,
}

/// Stores uploads under a single directory with random names
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes the file and returns the stored file name
    pub async fn save(&self, file: &UploadedFile) -> AppResult<String> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let name = stored_file_name(file.original_name.as_deref());
        tokio::fs::write(self.dir.join(&name), &file.bytes).await?;

        tracing::debug!(file = %name, size = file.bytes.len(), "Upload stored");
        Ok(name)
    }

    pub async fn remove(&self, name: &str) {
        if let Err(e) = tokio::fs::remove_file(self.dir.join(name)).await {
            tracing::warn!(error = %e, file = name, "Failed to remove stored upload");
        }
    }
}

fn stored_file_name(original_name: Option<&str>) -> String {
    let extension = original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|ext| ext.to_ascii_lowercase());

    match extension {
        Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
        None => Uuid::new_v4().to_string(),
    }
}
