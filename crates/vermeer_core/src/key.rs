//! Variant key codec.
//!
//! Parses the request path grammar into a typed key and serializes the key
//! back to its canonical string form, which doubles as the cache and storage
//! key. The grammar:
//!
//! ```text
//! {uuid}/{processor}_{width}x{height}.{ext}      scale = 1
//! {uuid}/{processor}_{width}x{height}_2x.{ext}   scale = 2
//! {uuid}/origin.{ext}                            original, scale = 1
//! {uuid}/origin_2x.{ext}                         original, scale = 2
//! ```
//!
//! An `origin_2x` request aliases `origin`: the original is definitionally at
//! source resolution, so both canonicalize to the same key and return the
//! same bytes. The parsed scale is still retained for logging.

use crate::asset::AssetId;
use crate::ext::{mime_for_ext, normalize_ext};
use serde::{Deserialize, Serialize};
use vermeer_error::{KeyError, KeyErrorKind};

/// Hard ceiling on requested width and height, in pixels.
pub const MAX_DIMENSION: u32 = 3000;

/// Named transformation applied to an original.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
pub enum Processor {
    /// Resize to the requested dimensions
    #[display("size")]
    Size,
    /// Serve the original bytes unchanged
    #[display("origin")]
    Origin,
}

impl Processor {
    /// Registry name of this processor.
    pub fn as_str(&self) -> &'static str {
        match self {
            Processor::Size => "size",
            Processor::Origin => "origin",
        }
    }
}

impl std::str::FromStr for Processor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "size" => Ok(Processor::Size),
            "origin" => Ok(Processor::Origin),
            _ => Err(format!("Unknown processor: {}", s)),
        }
    }
}

/// Pixel density multiplier for high-density displays.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
pub enum Scale {
    /// Standard density
    #[display("1x")]
    One,
    /// Double density
    #[display("2x")]
    Two,
}

impl Scale {
    /// Multiplier applied to requested dimensions.
    pub fn factor(&self) -> u32 {
        match self {
            Scale::One => 1,
            Scale::Two => 2,
        }
    }
}

/// Typed, canonical identity of a requested variant.
///
/// Value type derived deterministically from the request path; never stored
/// on its own. Invariants: `Size` keys carry both dimensions in
/// `(0, MAX_DIMENSION]`, `Origin` keys carry none.
///
/// # Examples
///
/// ```
/// use vermeer_core::VariantKey;
///
/// let key = VariantKey::parse("0c18bf64-9d37-4c9f-b8b5-23be3e8cf696/size_100x100_2x.JPEG").unwrap();
/// assert_eq!(
///     key.canonical(),
///     "0c18bf64-9d37-4c9f-b8b5-23be3e8cf696/size_100x100_2x.jpg"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantKey {
    asset_id: AssetId,
    processor: Processor,
    width: Option<u32>,
    height: Option<u32>,
    scale: Scale,
    ext: String,
}

impl VariantKey {
    /// Build a `size` key, validating the dimension range.
    pub fn size(
        asset_id: AssetId,
        width: u32,
        height: u32,
        scale: Scale,
        ext: &str,
    ) -> Result<Self, KeyError> {
        check_dimension(width)?;
        check_dimension(height)?;
        Ok(Self {
            asset_id,
            processor: Processor::Size,
            width: Some(width),
            height: Some(height),
            scale,
            ext: normalize_ext(ext),
        })
    }

    /// Build an `origin` key.
    pub fn origin(asset_id: AssetId, scale: Scale, ext: &str) -> Self {
        Self {
            asset_id,
            processor: Processor::Origin,
            width: None,
            height: None,
            scale,
            ext: normalize_ext(ext),
        }
    }

    /// Parse a request path into a typed key.
    ///
    /// All malformed input is a [`KeyError`]; the HTTP layer maps every kind
    /// to 404 since the read routes declare only 200 and 404.
    pub fn parse(path: &str) -> Result<Self, KeyError> {
        let trimmed = path.trim_start_matches('/');
        let (uuid_part, file_part) = trimmed
            .split_once('/')
            .ok_or_else(|| KeyError::new(KeyErrorKind::Malformed(path.to_string())))?;
        if file_part.is_empty() || file_part.contains('/') {
            return Err(KeyError::new(KeyErrorKind::Malformed(path.to_string())));
        }

        let asset_id = AssetId::parse(uuid_part)?;

        let (stem, ext) = file_part
            .rsplit_once('.')
            .ok_or_else(|| KeyError::new(KeyErrorKind::MissingExtension(file_part.to_string())))?;
        if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(KeyError::new(KeyErrorKind::MissingExtension(
                file_part.to_string(),
            )));
        }

        let (stem, scale) = match stem.strip_suffix("_2x") {
            Some(rest) => (rest, Scale::Two),
            None => (stem, Scale::One),
        };

        if stem == Processor::Origin.as_str() {
            return Ok(Self::origin(asset_id, scale, ext));
        }

        let (name, dims) = stem
            .split_once('_')
            .ok_or_else(|| KeyError::new(KeyErrorKind::UnknownProcessor(stem.to_string())))?;
        match name.parse::<Processor>() {
            Ok(Processor::Size) => {}
            // "origin_100x100.png": the processor exists but takes no dimensions
            Ok(Processor::Origin) => {
                return Err(KeyError::new(KeyErrorKind::InvalidDimensions(
                    dims.to_string(),
                )));
            }
            Err(_) => {
                return Err(KeyError::new(KeyErrorKind::UnknownProcessor(
                    name.to_string(),
                )));
            }
        }

        let (w, h) = dims
            .split_once('x')
            .ok_or_else(|| KeyError::new(KeyErrorKind::InvalidDimensions(dims.to_string())))?;
        let width = parse_dimension(w)?;
        let height = parse_dimension(h)?;

        Self::size(asset_id, width, height, scale, ext)
    }

    /// Stable canonical form, used as the cache and storage key.
    ///
    /// Lowercase UUID, normalized extension; `origin_2x` collapses to
    /// `origin` since both name the same bytes.
    pub fn canonical(&self) -> String {
        format!("{}/{}", self.asset_id, self.file_name())
    }

    /// Canonical file segment (the part after the UUID).
    pub fn file_name(&self) -> String {
        match self.processor {
            Processor::Origin => format!("origin.{}", self.ext),
            Processor::Size => {
                let (w, h) = (self.width.unwrap_or(0), self.height.unwrap_or(0));
                match self.scale {
                    Scale::One => format!("size_{}x{}.{}", w, h, self.ext),
                    Scale::Two => format!("size_{}x{}_2x.{}", w, h, self.ext),
                }
            }
        }
    }

    /// Blob storage key for the original this variant derives from.
    pub fn original_storage_key(&self) -> String {
        original_storage_key(&self.asset_id)
    }

    /// Blob storage key for the derivative itself.
    pub fn derived_storage_key(&self) -> String {
        format!("derived/{}/{}", self.asset_id, self.file_name())
    }

    /// Asset identifier this variant references.
    pub fn asset_id(&self) -> &AssetId {
        &self.asset_id
    }

    /// Processor named by this variant.
    pub fn processor(&self) -> Processor {
        self.processor
    }

    /// Requested width, present only on `size` keys.
    pub fn width(&self) -> Option<u32> {
        self.width
    }

    /// Requested height, present only on `size` keys.
    pub fn height(&self) -> Option<u32> {
        self.height
    }

    /// Requested density.
    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// Normalized extension.
    pub fn ext(&self) -> &str {
        &self.ext
    }

    /// MIME type implied by the extension.
    pub fn mime_type(&self) -> &'static str {
        mime_for_ext(&self.ext)
    }
}

impl std::fmt::Display for VariantKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.canonical())
    }
}

/// Blob storage key for an original asset.
pub fn original_storage_key(id: &AssetId) -> String {
    format!("originals/{}", id)
}

/// Blob storage key prefix covering every derivative of an asset.
pub fn derived_storage_prefix(id: &AssetId) -> String {
    format!("derived/{}/", id)
}

fn parse_dimension(s: &str) -> Result<u32, KeyError> {
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
        return Err(KeyError::new(KeyErrorKind::InvalidDimensions(s.to_string())));
    }
    let value: u32 = s
        .parse()
        .map_err(|_| KeyError::new(KeyErrorKind::InvalidDimensions(s.to_string())))?;
    check_dimension(value)?;
    Ok(value)
}

fn check_dimension(value: u32) -> Result<(), KeyError> {
    if value == 0 || value > MAX_DIMENSION {
        return Err(KeyError::new(KeyErrorKind::InvalidDimensions(
            value.to_string(),
        )));
    }
    Ok(())
}
