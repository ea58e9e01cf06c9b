//! Top-level error wrapper types.

use crate::{KeyError, PipelineError, ProcessorError, StorageError, UploadError};

/// Unified error enum spanning every Vermeer crate.
///
/// # Examples
///
/// ```
/// use vermeer_error::{VermeerError, StorageError, StorageErrorKind};
///
/// let storage_err = StorageError::new(StorageErrorKind::Unavailable("disk".into()));
/// let err: VermeerError = storage_err.into();
/// assert!(format!("{}", err).contains("Storage"));
/// ```
#[derive(Debug, Clone, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum VermeerErrorKind {
    /// Blob storage error
    #[from(StorageError)]
    Storage(StorageError),
    /// Variant key parse error
    #[from(KeyError)]
    Key(KeyError),
    /// Image processor error
    #[from(ProcessorError)]
    Processor(ProcessorError),
    /// Derivative pipeline error
    #[from(PipelineError)]
    Pipeline(PipelineError),
    /// Upload orchestration error
    #[from(UploadError)]
    Upload(UploadError),
}

/// Vermeer error with kind discrimination.
///
/// # Examples
///
/// ```
/// use vermeer_error::{VermeerResult, UploadError, UploadErrorKind};
///
/// fn might_fail() -> VermeerResult<()> {
///     Err(UploadError::new(UploadErrorKind::EmptyPayload))?
/// }
///
/// match might_fail() {
///     Ok(_) => println!("Success"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Vermeer Error: {}", _0)]
pub struct VermeerError(Box<VermeerErrorKind>);

impl VermeerError {
    /// Create a new error from a kind.
    pub fn new(kind: VermeerErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &VermeerErrorKind {
        &self.0
    }

    /// Whether this error represents a missing blob or asset.
    ///
    /// The read path maps these (and only these, plus parse errors) to a
    /// cache miss or 404 rather than a fault.
    pub fn is_not_found(&self) -> bool {
        match self.kind() {
            VermeerErrorKind::Storage(e) => e.is_not_found(),
            VermeerErrorKind::Pipeline(e) => matches!(
                e.kind,
                crate::PipelineErrorKind::AssetNotFound(_)
            ),
            _ => false,
        }
    }
}

// Generic From implementation for any type that converts to VermeerErrorKind
impl<T> From<T> for VermeerError
where
    T: Into<VermeerErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Vermeer operations.
///
/// # Examples
///
/// ```
/// use vermeer_error::{VermeerResult, KeyError, KeyErrorKind};
///
/// fn parse_path() -> VermeerResult<String> {
///     Err(KeyError::new(KeyErrorKind::Malformed("no slash".into())))?
/// }
/// ```
pub type VermeerResult<T> = std::result::Result<T, VermeerError>;
