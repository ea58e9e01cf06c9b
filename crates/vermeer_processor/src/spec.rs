//! Transform parameter types.

use serde::{Deserialize, Serialize};
use vermeer_core::{Scale, normalize_ext};

/// Aspect-ratio policy when the target shape differs from the source.
///
/// Arrives with each [`TransformSpec`], never hard-coded in a processor.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumString,
    derive_more::Display,
)]
#[strum(serialize_all = "lowercase")]
pub enum ResizeMode {
    /// Distort to exactly the requested shape
    #[display("stretch")]
    Stretch,
    /// Preserve aspect ratio, fit within the requested box
    #[display("fit")]
    Fit,
    /// Preserve aspect ratio, fill the box and crop the overflow
    #[display("crop")]
    Crop,
}

/// Parameters of a single transform invocation.
///
/// Width and height are the requested CSS-pixel dimensions; the physical
/// output is `width·scale × height·scale`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransformSpec {
    width: u32,
    height: u32,
    scale: Scale,
    ext: String,
    mode: ResizeMode,
}

impl TransformSpec {
    /// Create a transform spec. The extension is normalized.
    pub fn new(width: u32, height: u32, scale: Scale, ext: &str, mode: ResizeMode) -> Self {
        Self {
            width,
            height,
            scale,
            ext: normalize_ext(ext),
            mode,
        }
    }

    /// Requested width in CSS pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Requested height in CSS pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Density multiplier.
    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// Normalized output extension.
    pub fn ext(&self) -> &str {
        &self.ext
    }

    /// Aspect-ratio policy.
    pub fn mode(&self) -> ResizeMode {
        self.mode
    }

    /// Physical output width in pixels.
    pub fn pixel_width(&self) -> u32 {
        self.width * self.scale.factor()
    }

    /// Physical output height in pixels.
    pub fn pixel_height(&self) -> u32 {
        self.height * self.scale.factor()
    }
}
