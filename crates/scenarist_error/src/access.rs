//! Access control error types.

/// Access control and project bookkeeping failures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum AccessErrorKind {
    /// Project id does not exist
    #[display("Project not found: {}", _0)]
    ProjectNotFound(i32),
    /// User id or name does not exist
    #[display("User not found: {}", _0)]
    UserNotFound(String),
    /// Username is already taken
    #[display("Username already registered: {}", _0)]
    UsernameTaken(String),
    /// User lacks the required permission level
    #[display("Access denied to project {}: requires {}", project_id, required)]
    Denied {
        /// Project id
        project_id: i32,
        /// Required permission level
        required: String,
    },
    /// Only the project owner may perform this operation
    #[display("Only the project owner can {}", _0)]
    OwnerOnly(String),
    /// Permission level string is not READ, WRITE or ADMIN
    #[display("Invalid permission level: {}", _0)]
    InvalidPermission(String),
    /// Backing store failure
    #[display("Project store error: {}", _0)]
    Store(String),
}

/// Access control error with location tracking.
///
/// # Examples
///
/// ```
/// use scenarist_error::{AccessError, AccessErrorKind};
///
/// let err = AccessError::new(AccessErrorKind::OwnerOnly("share".to_string()));
/// assert!(format!("{}", err).contains("owner"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Access Error: {} at line {} in {}", kind, line, file)]
pub struct AccessError {
    /// The kind of error that occurred
    pub kind: AccessErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl AccessError {
    /// Create a new AccessError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: AccessErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
