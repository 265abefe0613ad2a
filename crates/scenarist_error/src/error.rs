//! Top-level error wrapper types.

#[cfg(feature = "database")]
use crate::DatabaseError;
use crate::{
    AccessError, BuilderError, ConfigError, HttpError, JsonError, LlmError, StorageError,
    WorkflowError,
};

/// Every error condition a Scenarist operation can surface.
///
/// # Examples
///
/// ```
/// use scenarist_error::{ScenaristError, HttpError};
///
/// let http_err = HttpError::new("Connection failed");
/// let err: ScenaristError = http_err.into();
/// assert!(format!("{}", err).contains("HTTP Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum ScenaristErrorKind {
    /// HTTP error
    #[from(HttpError)]
    Http(HttpError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Builder error
    #[from(BuilderError)]
    Builder(BuilderError),
    /// Artifact store error
    #[from(StorageError)]
    Storage(StorageError),
    /// LLM gateway error
    #[from(LlmError)]
    Llm(LlmError),
    /// Workflow stage error
    #[from(WorkflowError)]
    Workflow(WorkflowError),
    /// Access control error
    #[from(AccessError)]
    Access(AccessError),
    /// Database error
    #[cfg(feature = "database")]
    #[from(DatabaseError)]
    Database(DatabaseError),
}

/// Scenarist error with kind discrimination.
///
/// # Examples
///
/// ```
/// use scenarist_error::{ScenaristResult, ConfigError};
///
/// fn might_fail() -> ScenaristResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Scenarist Error: {}", _0)]
pub struct ScenaristError(Box<ScenaristErrorKind>);

impl ScenaristError {
    /// Create a new error from a kind.
    pub fn new(kind: ScenaristErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ScenaristErrorKind {
        &self.0
    }

    /// Returns the LLM error if this error came from the gateway.
    pub fn as_llm(&self) -> Option<&LlmError> {
        match self.kind() {
            ScenaristErrorKind::Llm(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the storage error, if any.
    pub fn as_storage(&self) -> Option<&StorageError> {
        match self.kind() {
            ScenaristErrorKind::Storage(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the workflow error, if any.
    pub fn as_workflow(&self) -> Option<&WorkflowError> {
        match self.kind() {
            ScenaristErrorKind::Workflow(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the access control error, if any.
    pub fn as_access(&self) -> Option<&AccessError> {
        match self.kind() {
            ScenaristErrorKind::Access(e) => Some(e),
            _ => None,
        }
    }
}

// Generic From implementation for any type that converts to ScenaristErrorKind
impl<T> From<T> for ScenaristError
where
    T: Into<ScenaristErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Scenarist operations.
pub type ScenaristResult<T> = std::result::Result<T, ScenaristError>;
