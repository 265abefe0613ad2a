//! File attachments sent alongside prompts.

use scenarist_error::{StorageError, StorageErrorKind};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Attachment content types accepted by the pipeline.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
pub enum AttachmentMime {
    /// Plain UTF-8 text (`.txt`)
    #[display("text/plain")]
    #[serde(rename = "text/plain")]
    Text,
    /// PDF document (`.pdf`)
    #[display("application/pdf")]
    #[serde(rename = "application/pdf")]
    Pdf,
}

impl AttachmentMime {
    /// Resolves the MIME type from a file extension.
    ///
    /// Only `.txt` and `.pdf` are supported.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("txt") => Some(Self::Text),
            Some("pdf") => Some(Self::Pdf),
            _ => None,
        }
    }

    /// MIME string as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text/plain",
            Self::Pdf => "application/pdf",
        }
    }
}

/// A document passed to the model together with the prompt.
///
/// # Examples
///
/// ```
/// use scenarist_core::{Attachment, AttachmentMime};
///
/// let facts = Attachment::text("hypotheses.txt", "1. The archive was moved in 1941.");
/// assert_eq!(*facts.mime(), AttachmentMime::Text);
/// assert_eq!(facts.data().len(), 34);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct Attachment {
    /// Original file name, used for logging and as a label in prompts
    filename: String,
    /// Content type
    mime: AttachmentMime,
    /// Raw file bytes
    data: Vec<u8>,
}

impl Attachment {
    /// Creates an attachment from in-memory parts.
    pub fn new(filename: impl Into<String>, mime: AttachmentMime, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            mime,
            data,
        }
    }

    /// Creates a text attachment.
    pub fn text(filename: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(filename, AttachmentMime::Text, content.into().into_bytes())
    }

    /// Reads a `.txt` or `.pdf` file from disk.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the file does not exist and `UnsupportedFormat`
    /// for any other extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(StorageError::new(StorageErrorKind::NotFound(
                path.display().to_string(),
            )));
        }
        let mime = AttachmentMime::from_path(path).ok_or_else(|| {
            StorageError::new(StorageErrorKind::UnsupportedFormat(
                path.display().to_string(),
            ))
        })?;
        let data = std::fs::read(path).map_err(|e| {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                path.display(),
                e
            )))
        })?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(filename, mime, data))
    }

    /// Size of the payload in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
