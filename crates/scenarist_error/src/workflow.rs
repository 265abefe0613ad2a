//! Workflow stage error types.

/// Specific error conditions raised while running pipeline stages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum WorkflowErrorKind {
    /// Project has no source documents in DB/
    #[display("No source documents found in {}", _0)]
    NoSources(String),
    /// A stage ran before the artifact it consumes was produced
    #[display("Stage '{}' requires {} (run '{}' first)", stage, artifact, producer)]
    MissingInput {
        /// Stage that was invoked
        stage: String,
        /// Missing artifact path
        artifact: String,
        /// Stage that produces the artifact
        producer: String,
    },
    /// Number of series outside the accepted range
    #[display("Number of series must be between 1 and {}, got {}", max, requested)]
    InvalidSeriesCount {
        /// Requested count
        requested: u32,
        /// Upper bound
        max: u32,
    },
    /// Structured call did not yield JSON of the expected shape
    #[display("Structured output for '{}' is invalid: {}", stage, message)]
    StructuredOutputInvalid {
        /// Stage name
        stage: String,
        /// Parse failure description
        message: String,
    },
    /// Prompt book has no entry for the key
    #[display("Prompt '{}' not found in prompt book", _0)]
    MissingPrompt(String),
    /// Prompt book could not be parsed
    #[display("Failed to parse prompt book: {}", _0)]
    PromptBookParse(String),
    /// Unknown facts algorithm name
    #[display("Unknown facts algorithm: {}", _0)]
    UnknownAlgorithm(String),
    /// Structure has no chapters to write
    #[display("Script structure contains no chapters")]
    EmptyStructure,
}

/// Error type for workflow operations.
///
/// # Examples
///
/// ```
/// use scenarist_error::{WorkflowError, WorkflowErrorKind};
///
/// let err = WorkflowError::new(WorkflowErrorKind::EmptyStructure);
/// assert!(format!("{}", err).contains("no chapters"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Workflow Error: {} at line {} in {}", kind, line, file)]
pub struct WorkflowError {
    /// The specific error condition
    pub kind: WorkflowErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl WorkflowError {
    /// Create a new WorkflowError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: WorkflowErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
