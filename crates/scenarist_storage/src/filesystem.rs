//! Local filesystem artifact store.

use crate::{ArtifactStore, ProjectLayout};
use scenarist_error::{ScenaristResult, StorageError, StorageErrorKind};
use std::path::{Path, PathBuf};

/// Stores artifacts as plain files inside the project folder.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// reader never observes a half-written checkpoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSystemArtifactStore;

impl FileSystemArtifactStore {
    /// Create a store.
    pub fn new() -> Self {
        Self
    }

    fn temp_path(path: &Path) -> PathBuf {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        path.with_file_name(format!(".{}.tmp", name))
    }

    fn read_error(path: &Path, e: std::io::Error) -> StorageError {
        if e.kind() == std::io::ErrorKind::NotFound {
            StorageError::new(StorageErrorKind::NotFound(path.display().to_string()))
        } else {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                path.display(),
                e
            )))
        }
    }
}

#[async_trait::async_trait]
impl ArtifactStore for FileSystemArtifactStore {
    #[tracing::instrument(skip(self), fields(path = %path.display()))]
    async fn read_text(&self, path: &Path) -> ScenaristResult<String> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Self::read_error(path, e))?;
        tracing::trace!(bytes = content.len(), "Read artifact");
        Ok(content)
    }

    #[tracing::instrument(skip(self, content), fields(path = %path.display(), bytes = content.len()))]
    async fn write_text(&self, path: &Path, content: &str) -> ScenaristResult<()> {
        if path.file_name().is_none() {
            return Err(StorageError::new(StorageErrorKind::InvalidPath(
                path.display().to_string(),
            ))
            .into());
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }

        let temp_path = Self::temp_path(path);
        tokio::fs::write(&temp_path, content).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;

        if let Err(e) = tokio::fs::rename(&temp_path, path).await {
            if let Err(cleanup) = tokio::fs::remove_file(&temp_path).await {
                tracing::warn!(
                    temp = %temp_path.display(),
                    error = %cleanup,
                    "Failed to remove temporary file"
                );
            }
            return Err(StorageError::new(StorageErrorKind::FileWrite(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            )))
            .into());
        }

        tracing::debug!("Wrote artifact");
        Ok(())
    }

    async fn read_bytes(&self, path: &Path) -> ScenaristResult<Vec<u8>> {
        Ok(tokio::fs::read(path)
            .await
            .map_err(|e| Self::read_error(path, e))?)
    }

    async fn exists(&self, path: &Path) -> ScenaristResult<bool> {
        tokio::fs::try_exists(path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                path.display(),
                e
            )))
            .into()
        })
    }

    #[tracing::instrument(skip(self, layout), fields(root = %layout.root().display()))]
    async fn list_sources(&self, layout: &ProjectLayout) -> ScenaristResult<Vec<PathBuf>> {
        let db_dir = layout.db_dir();
        let mut entries = match tokio::fs::read_dir(&db_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Self::read_error(&db_dir, e).into()),
        };

        let mut sources = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Self::read_error(&db_dir, e))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| Self::read_error(&entry.path(), e))?;
            if file_type.is_file() {
                sources.push(entry.path());
            }
        }
        sources.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        tracing::debug!(count = sources.len(), "Listed source documents");
        Ok(sources)
    }

    #[tracing::instrument(skip(self, layout), fields(root = %layout.root().display()))]
    async fn remove_project(&self, layout: &ProjectLayout) -> ScenaristResult<()> {
        match tokio::fs::remove_dir_all(layout.root()).await {
            Ok(()) => {
                tracing::info!("Removed project folder");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::new(StorageErrorKind::FileWrite(format!(
                "delete {}: {}",
                layout.root().display(),
                e
            )))
            .into()),
        }
    }
}
