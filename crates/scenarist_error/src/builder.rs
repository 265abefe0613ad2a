//! Request and settings builder errors.

/// Why a builder refused to produce a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum BuilderErrorKind {
    /// A field without a default was never set
    #[display("Incomplete builder: {}", _0)]
    Incomplete(String),
    /// A field was set to a value outside its accepted range
    #[display("Invalid value: {}", _0)]
    InvalidValue(String),
}

/// Builder error with location tracking.
///
/// # Examples
///
/// ```
/// use scenarist_error::{BuilderError, BuilderErrorKind};
///
/// let err: BuilderError = String::from("max_output_tokens must be positive").into();
/// assert!(matches!(err.kind, BuilderErrorKind::InvalidValue(_)));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Builder Error: {} at line {} in {}", kind, line, file)]
pub struct BuilderError {
    /// What went wrong
    pub kind: BuilderErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl BuilderError {
    /// Create a new builder error with caller location tracking.
    #[track_caller]
    pub fn new(kind: BuilderErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// A required field is missing (derive_builder's uninitialized-field message).
    #[track_caller]
    pub fn incomplete(message: impl Into<String>) -> Self {
        Self::new(BuilderErrorKind::Incomplete(message.into()))
    }
}

/// Range and consistency checks report their message as a `String`.
impl From<String> for BuilderError {
    #[track_caller]
    fn from(msg: String) -> Self {
        Self::new(BuilderErrorKind::InvalidValue(msg))
    }
}
