//! Blob storage for uploaded documents.
//!
//! Keys are relative, `/`-separated paths. [`LocalBlobStore`] maps them onto a
//! root directory on disk.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// Normalize a storage key.
///
/// Backslashes become `/`, leading/trailing slashes and empty segments are
/// dropped, and `.`/`..` segments are rejected.
pub fn sanitize_path(raw: &str) -> Result<String, CoreError> {
    let normalized = raw.replace('\\', "/");
    let mut segments = Vec::new();
    for segment in normalized.split('/') {
        match segment {
            "" => continue,
            "." | ".." => {
                return Err(CoreError::Validation(format!(
                    "Storage path '{raw}' must not contain relative segments"
                )))
            }
            s => segments.push(s),
        }
    }
    if segments.is_empty() {
        return Err(CoreError::Validation("Storage path must not be empty".into()));
    }
    Ok(segments.join("/"))
}

/// Key for a project document: `projects/{project_id}/{unique}_{file_name}`.
pub fn project_document_key(
    project_id: DbId,
    unique: &str,
    file_name: &str,
) -> Result<String, CoreError> {
    let file_name = file_name.replace(['/', '\\'], "_");
    sanitize_path(&format!("projects/{project_id}/{unique}_{file_name}"))
}

// ---------------------------------------------------------------------------
// Blob store
// ---------------------------------------------------------------------------

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write `bytes` under `key`, replacing any existing blob.
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), CoreError>;

    /// Read a blob, `None` when absent.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CoreError>;

    /// Remove a blob. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), CoreError>;
}

/// Filesystem-backed [`BlobStore`].
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, CoreError> {
        Ok(self.root.join(sanitize_path(key)?))
    }
}

fn io_error(action: &str, key: &str, err: std::io::Error) -> CoreError {
    CoreError::Internal(format!("Failed to {action} blob '{key}': {err}"))
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), CoreError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error("create directory for", key, e))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| io_error("write", key, e))?;
        tracing::debug!(key, size = bytes.len(), "Blob stored");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CoreError> {
        let path = self.resolve(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error("read", key, e)),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), CoreError> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(key, "Blob deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error("delete", key, e)),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn sanitize_normalizes_separators() {
        assert_eq!(sanitize_path("\\a\\b//c/").unwrap(), "a/b/c");
        assert_eq!(sanitize_path("file.pdf").unwrap(), "file.pdf");
    }

    #[test]
    fn sanitize_rejects_traversal_and_empty() {
        assert_matches!(sanitize_path("a/../b"), Err(CoreError::Validation(_)));
        assert_matches!(sanitize_path("./a"), Err(CoreError::Validation(_)));
        assert_matches!(sanitize_path("///"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn document_key_flattens_file_name() {
        let key = project_document_key(12, "abc", "drawings/rev 2.pdf").unwrap();
        assert_eq!(key, "projects/12/abc_drawings_rev 2.pdf");
    }

    #[tokio::test]
    async fn local_store_round_trips_blobs() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());

        store.put("projects/1/a.txt", b"hello").await.unwrap();
        assert_eq!(
            store.get("projects/1/a.txt").await.unwrap().as_deref(),
            Some(&b"hello"[..])
        );

        store.delete("projects/1/a.txt").await.unwrap();
        assert!(store.get("projects/1/a.txt").await.unwrap().is_none());
        store.delete("projects/1/a.txt").await.unwrap();
    }

    #[tokio::test]
    async fn local_store_rejects_escaping_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());
        assert_matches!(
            store.put("../outside.txt", b"x").await,
            Err(CoreError::Validation(_))
        );
    }
}
