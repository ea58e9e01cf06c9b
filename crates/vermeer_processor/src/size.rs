//! Built-in `size` processor.

use crate::{ImageProcessor, ResizeMode, TransformSpec};
use image::{DynamicImage, ImageFormat, imageops::FilterType};
use std::io::Cursor;
use vermeer_core::MAX_DIMENSION;
use vermeer_error::{ProcessorError, ProcessorErrorKind};

/// Resizes an original to `width·scale × height·scale` pixels and re-encodes
/// it to the format implied by the requested extension.
///
/// The input format is sniffed from the bytes, so a `.png` derivative can be
/// produced from a JPEG original and vice versa. The aspect-ratio policy
/// arrives with each [`TransformSpec`]; only the resampling filter is fixed
/// per processor instance.
pub struct SizeProcessor {
    filter: FilterType,
}

impl SizeProcessor {
    /// Create a size processor with the default Lanczos resampling filter.
    pub fn new() -> Self {
        Self {
            filter: FilterType::Lanczos3,
        }
    }

    /// Override the resampling filter.
    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }
}

impl Default for SizeProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageProcessor for SizeProcessor {
    #[tracing::instrument(skip(self, src), fields(size = src.len(), width = spec.width(), height = spec.height(), scale = %spec.scale(), ext = spec.ext()))]
    fn transform(&self, src: &[u8], spec: &TransformSpec) -> Result<Vec<u8>, ProcessorError> {
        if spec.width() == 0
            || spec.height() == 0
            || spec.width() > MAX_DIMENSION
            || spec.height() > MAX_DIMENSION
        {
            return Err(ProcessorError::new(ProcessorErrorKind::DimensionOutOfRange(
                format!("{}x{}", spec.width(), spec.height()),
            )));
        }

        let format = ImageFormat::from_extension(spec.ext()).ok_or_else(|| {
            ProcessorError::new(ProcessorErrorKind::UnsupportedFormat(spec.ext().to_string()))
        })?;

        let img = image::load_from_memory(src).map_err(|e| {
            ProcessorError::new(ProcessorErrorKind::DecodeFailure(e.to_string()))
        })?;

        let (w, h) = (spec.pixel_width(), spec.pixel_height());
        let resized = match spec.mode() {
            ResizeMode::Stretch => img.resize_exact(w, h, self.filter),
            ResizeMode::Fit => img.resize(w, h, self.filter),
            ResizeMode::Crop => img.resize_to_fill(w, h, self.filter),
        };

        // JPEG has no alpha channel; flatten before encoding
        let resized = if format == ImageFormat::Jpeg {
            DynamicImage::ImageRgb8(resized.to_rgb8())
        } else {
            resized
        };

        let mut out = Cursor::new(Vec::new());
        resized.write_to(&mut out, format).map_err(|e| {
            ProcessorError::new(ProcessorErrorKind::EncodeFailure(e.to_string()))
        })?;

        tracing::debug!(
            out_width = w,
            out_height = h,
            out_bytes = out.get_ref().len(),
            "Produced derivative"
        );
        Ok(out.into_inner())
    }
}

impl std::fmt::Debug for SizeProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SizeProcessor")
            .field("filter", &self.filter)
            .finish()
    }
}
