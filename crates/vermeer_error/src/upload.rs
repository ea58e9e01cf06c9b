//! Upload error types.

/// Kinds of upload errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum UploadErrorKind {
    /// Payload was absent or zero bytes
    #[display("Empty upload payload")]
    EmptyPayload,
    /// File name carried no usable extension
    #[display("Upload has no file extension: {}", _0)]
    MissingExtension(String),
    /// Extension is not on the configured allowlist
    #[display("Disallowed upload type: {}", _0)]
    DisallowedType(String),
    /// Caller is not permitted to upload
    #[display("Upload forbidden: {}", _0)]
    Forbidden(String),
}

/// Upload error with location tracking.
///
/// # Examples
///
/// ```
/// use vermeer_error::{UploadError, UploadErrorKind};
///
/// let err = UploadError::new(UploadErrorKind::EmptyPayload);
/// assert!(format!("{}", err).contains("Empty"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Upload Error: {} at line {} in {}", kind, line, file)]
pub struct UploadError {
    /// The kind of error that occurred
    pub kind: UploadErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl UploadError {
    /// Create a new upload error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: UploadErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
