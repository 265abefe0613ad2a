//! Artifact store error types.

/// Kinds of artifact store errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StorageErrorKind {
    /// Failed to create a project directory
    #[display("Failed to create directory: {}", _0)]
    DirectoryCreation(String),
    /// Failed to write an artifact
    #[display("Failed to write file: {}", _0)]
    FileWrite(String),
    /// Failed to read an artifact
    #[display("Failed to read file: {}", _0)]
    FileRead(String),
    /// Artifact or source file does not exist
    #[display("File not found: {}", _0)]
    NotFound(String),
    /// Path escapes the project folder or is otherwise unusable
    #[display("Invalid storage path: {}", _0)]
    InvalidPath(String),
    /// Source file has an extension other than .txt or .pdf
    #[display("Unsupported file format: {} (only .txt or .pdf)", _0)]
    UnsupportedFormat(String),
    /// Stage name is not one of the editable stage files
    #[display("Unknown stage: {}", _0)]
    UnknownStage(String),
    /// Artifact content does not match its expected shape
    #[display("Malformed artifact {}: {}", path, message)]
    Malformed {
        /// Artifact path
        path: String,
        /// Parse failure description
        message: String,
    },
}

/// Storage error with location tracking.
///
/// # Examples
///
/// ```
/// use scenarist_error::{StorageError, StorageErrorKind};
///
/// let err = StorageError::new(StorageErrorKind::NotFound("FACTS/db_extension.txt".to_string()));
/// assert!(format!("{}", err).contains("not found"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Storage Error: {} at line {} in {}", kind, line, file)]
pub struct StorageError {
    /// The kind of error that occurred
    pub kind: StorageErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StorageError {
    /// Create a new storage error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StorageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
