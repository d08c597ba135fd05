// src/infrastructure/blob_dir.rs
use crate::application::BlobStore;
use crate::domain::{DomainError, ImageRef};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Blob store writing each blob as a file below a root directory.
///
/// References handed out by `get` are `file://` URLs of the stored files.
/// `get` only builds the reference; it does not check that the file exists.
pub struct DirectoryBlobStore {
    root: PathBuf,
}

impl DirectoryBlobStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = PathBuf::from(root.as_ref());
        debug!(?root, "Creating new DirectoryBlobStore");
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a key to its file, rejecting anything but a plain file name
    fn blob_path(&self, key: &str) -> Result<PathBuf, DomainError> {
        let is_plain_name = !key.is_empty()
            && key != "."
            && key != ".."
            && !key.contains(['/', '\\']);
        if !is_plain_name {
            return Err(DomainError::BlobStore(format!("Invalid blob key: {:?}", key)));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl BlobStore for DirectoryBlobStore {
    #[instrument(level = "debug", skip(self))]
    async fn get(&self, key: &str) -> Result<ImageRef, DomainError> {
        let path = self.blob_path(key)?;
        let absolute = std::path::absolute(&path).map_err(|e| {
            DomainError::BlobStore(format!("Failed to resolve {}: {}", path.display(), e))
        })?;
        Ok(ImageRef::new(format!("file://{}", absolute.display())))
    }

    #[instrument(level = "debug", skip(self, bytes), fields(len = bytes.len()))]
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), DomainError> {
        let path = self.blob_path(key)?;
        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            DomainError::BlobStore(format!(
                "Failed to create blob directory {}: {}",
                self.root.display(),
                e
            ))
        })?;
        tokio::fs::write(&path, bytes).await.map_err(|e| {
            DomainError::BlobStore(format!("Failed to write {}: {}", path.display(), e))
        })?;

        info!(key, "Stored blob");
        Ok(())
    }
}
