//! Asset identity and catalog record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use vermeer_error::{KeyError, KeyErrorKind};

/// Unique identifier for an uploaded original asset.
///
/// # Examples
///
/// ```
/// use vermeer_core::AssetId;
///
/// let id = AssetId::new();
/// let parsed = AssetId::parse(&id.to_string()).unwrap();
/// assert_eq!(id, parsed);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssetId(Uuid);

impl AssetId {
    /// Generate a fresh random asset ID.
    ///
    /// Version 4 UUIDs carry 122 random bits; collision probability is
    /// treated as negligible and no retry loop is attempted.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse from a string.
    ///
    /// Only the hyphenated spelling is accepted (case-insensitively);
    /// `Uuid::parse_str` alone would also admit the simple, braced, and URN
    /// forms, which the path grammar does not.
    pub fn parse(s: &str) -> Result<Self, KeyError> {
        let id = Uuid::parse_str(s)
            .map_err(|_| KeyError::new(KeyErrorKind::InvalidUuid(s.to_string())))?;
        if !s.eq_ignore_ascii_case(&id.to_string()) {
            return Err(KeyError::new(KeyErrorKind::InvalidUuid(s.to_string())));
        }
        Ok(Self(id))
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AssetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetId({})", self.0)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Uuid renders lowercase hyphenated, which is also the canonical
        // form used in storage keys.
        write!(f, "{}", self.0)
    }
}

/// Catalog record for an uploaded original.
///
/// Metadata lives in the external catalog while the bytes live in blob
/// storage; this record is the bridge between the two.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct AssetRecord {
    /// Asset identifier
    id: AssetId,
    /// Declared (normalized) file extension, e.g. "png"
    ext: String,
    /// MIME type inferred from the extension
    mime_type: String,
    /// Size of the original in bytes
    size_bytes: i64,
    /// SHA-256 hash of the original content
    content_hash: String,
    /// When the original was uploaded
    uploaded_at: DateTime<Utc>,
}

impl AssetRecord {
    /// Create a record stamped with the current time.
    pub fn new(
        id: AssetId,
        ext: impl Into<String>,
        mime_type: impl Into<String>,
        size_bytes: i64,
        content_hash: impl Into<String>,
    ) -> Self {
        Self {
            id,
            ext: ext.into(),
            mime_type: mime_type.into(),
            size_bytes,
            content_hash: content_hash.into(),
            uploaded_at: Utc::now(),
        }
    }
}
