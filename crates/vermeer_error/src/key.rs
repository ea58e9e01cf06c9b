//! Variant key parse error types.

/// Kinds of variant key parse errors.
///
/// Every kind maps to a 404 at the HTTP layer: the read route family declares
/// only 200 and 404, so malformed paths are indistinguishable from missing
/// resources to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum KeyErrorKind {
    /// Path does not have the `{uuid}/{variant}` shape
    #[display("Malformed variant path: {}", _0)]
    Malformed(String),
    /// Leading path segment is not a UUID
    #[display("Invalid asset UUID: {}", _0)]
    InvalidUuid(String),
    /// Processor name is not recognized
    #[display("Unknown processor: {}", _0)]
    UnknownProcessor(String),
    /// Width or height is not a positive integer within the allowed range
    #[display("Dimension out of range: {}", _0)]
    InvalidDimensions(String),
    /// Variant file name has no extension
    #[display("Missing extension: {}", _0)]
    MissingExtension(String),
}

/// Variant key parse error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Key Error: {} at line {} in {}", kind, line, file)]
pub struct KeyError {
    /// The kind of error that occurred
    pub kind: KeyErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl KeyError {
    /// Create a new key error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: KeyErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
