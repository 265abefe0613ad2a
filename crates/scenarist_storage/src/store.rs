//! Artifact store abstraction.

use crate::ProjectLayout;
use scenarist_error::{JsonError, ScenaristResult, StorageError, StorageErrorKind};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Reads and writes project artifacts.
///
/// Paths are absolute, as produced by [`ProjectLayout`]. Writers create
/// missing parent directories.
#[async_trait::async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Read a UTF-8 artifact.
    ///
    /// # Errors
    ///
    /// `NotFound` when the file does not exist.
    async fn read_text(&self, path: &Path) -> ScenaristResult<String>;

    /// Replace an artifact's content atomically.
    async fn write_text(&self, path: &Path, content: &str) -> ScenaristResult<()>;

    /// Read an artifact as raw bytes (source documents).
    async fn read_bytes(&self, path: &Path) -> ScenaristResult<Vec<u8>>;

    /// Whether the artifact exists.
    async fn exists(&self, path: &Path) -> ScenaristResult<bool>;

    /// Regular files in `DB/`, sorted by file name. A missing `DB/` yields
    /// an empty list.
    async fn list_sources(&self, layout: &ProjectLayout) -> ScenaristResult<Vec<PathBuf>>;

    /// Delete the whole project folder. Missing folders are not an error.
    async fn remove_project(&self, layout: &ProjectLayout) -> ScenaristResult<()>;

    /// Read an artifact, treating a missing file as `None`.
    async fn read_optional_text(&self, path: &Path) -> ScenaristResult<Option<String>> {
        if self.exists(path).await? {
            self.read_text(path).await.map(Some)
        } else {
            Ok(None)
        }
    }
}

/// Typed JSON access on top of any [`ArtifactStore`].
#[async_trait::async_trait]
pub trait ArtifactStoreExt: ArtifactStore {
    /// Deserialize a JSON artifact.
    ///
    /// # Errors
    ///
    /// `NotFound` when missing, `Malformed` when the content does not match `T`.
    async fn read_json<T: DeserializeOwned>(&self, path: &Path) -> ScenaristResult<T> {
        let content = self.read_text(path).await?;
        serde_json::from_str(&content).map_err(|e| {
            StorageError::new(StorageErrorKind::Malformed {
                path: path.display().to_string(),
                message: e.to_string(),
            })
            .into()
        })
    }

    /// Serialize as pretty-printed UTF-8 JSON (non-ASCII kept verbatim).
    async fn write_json<T: Serialize + Sync>(&self, path: &Path, value: &T) -> ScenaristResult<()> {
        let content = serde_json::to_string_pretty(value)
            .map_err(|e| JsonError::new(format!("serialize {}: {}", path.display(), e)))?;
        self.write_text(path, &content).await
    }
}

impl<S: ArtifactStore + ?Sized> ArtifactStoreExt for S {}
