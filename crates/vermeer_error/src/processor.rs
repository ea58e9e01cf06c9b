//! Image processor error types.

/// Kinds of processor errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ProcessorErrorKind {
    /// No processor registered under the requested name
    #[display("No processor registered: {}", _0)]
    Unregistered(String),
    /// Extension does not correspond to a supported image format
    #[display("Unsupported format: {}", _0)]
    UnsupportedFormat(String),
    /// Source bytes could not be decoded
    #[display("Failed to decode source image: {}", _0)]
    DecodeFailure(String),
    /// Derivative could not be encoded
    #[display("Failed to encode derivative: {}", _0)]
    EncodeFailure(String),
    /// Requested dimensions exceed the safety ceiling
    #[display("Dimension out of range: {}", _0)]
    DimensionOutOfRange(String),
    /// Transform exceeded its time budget
    #[display("Transform timed out: {}", _0)]
    Timeout(String),
}

/// Processor error with location tracking.
///
/// # Examples
///
/// ```
/// use vermeer_error::{ProcessorError, ProcessorErrorKind};
///
/// let err = ProcessorError::new(ProcessorErrorKind::UnsupportedFormat("tiff".to_string()));
/// assert!(format!("{}", err).contains("Unsupported format"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Processor Error: {} at line {} in {}", kind, line, file)]
pub struct ProcessorError {
    /// The kind of error that occurred
    pub kind: ProcessorErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ProcessorError {
    /// Create a new processor error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ProcessorErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
