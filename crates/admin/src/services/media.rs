//! Storage for uploaded images.
//!
//! Files are written under the configured media root as
//! `<upload_to>/<uuid>.<ext>` and the relative path is what gets stored in
//! the database. They are served back under `/media/`.

use std::io;
use std::path::{Path, PathBuf};

use eshop_core::ImageFormat;
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

/// URL prefix uploaded files are served from.
pub const MEDIA_URL: &str = "/media";

/// Errors that can occur while storing an upload.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Writes validated uploads to disk.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory uploads are written to and served from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store an already-validated image under `upload_to`.
    ///
    /// Returns the media-relative path to save in the row.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::Write` if the directory or file cannot be written.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn save(
        &self,
        upload_to: &str,
        bytes: &[u8],
        format: ImageFormat,
    ) -> Result<String, MediaError> {
        let dir = self.root.join(upload_to);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| MediaError::Write {
                path: dir.clone(),
                source,
            })?;

        let relative = format!("{upload_to}/{}.{}", Uuid::new_v4(), format.extension());
        let path = self.root.join(&relative);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| MediaError::Write { path, source })?;

        tracing::debug!(path = %relative, "Stored upload");
        Ok(relative)
    }

    /// Delete a stored file. Missing files are ignored; other failures are logged.
    pub async fn remove(&self, relative: &str) {
        let path = self.root.join(relative);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::debug!(path = %relative, "Removed upload"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %relative, error = %e, "Failed to remove upload"),
        }
    }
}

/// Public URL for a stored media path.
#[must_use]
pub fn media_url(relative: &str) -> String {
    format!("{MEDIA_URL}/{relative}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_store() -> MediaStore {
        MediaStore::new(std::env::temp_dir().join(format!("eshop-media-{}", Uuid::new_v4())))
    }

    #[tokio::test]
    async fn test_save_and_remove() {
        let store = temp_store();
        let bytes = b"\x89PNG\r\n\x1a\nrest";

        let relative = store.save("product", bytes, ImageFormat::Png).await.unwrap();
        assert!(relative.starts_with("product/"));
        assert!(relative.ends_with(".png"));

        let written = tokio::fs::read(store.root().join(&relative)).await.unwrap();
        assert_eq!(written, bytes);

        store.remove(&relative).await;
        assert!(!store.root().join(&relative).exists());

        // Removing twice is harmless.
        store.remove(&relative).await;
        tokio::fs::remove_dir_all(store.root()).await.unwrap();
    }

    #[tokio::test]
    async fn test_uploads_get_distinct_names() {
        let store = temp_store();
        let a = store.save("avatar", b"x", ImageFormat::Jpeg).await.unwrap();
        let b = store.save("avatar", b"x", ImageFormat::Jpeg).await.unwrap();
        assert_ne!(a, b);
        tokio::fs::remove_dir_all(store.root()).await.unwrap();
    }

    #[test]
    fn test_media_url() {
        assert_eq!(media_url("category/a.webp"), "/media/category/a.webp");
    }
}
