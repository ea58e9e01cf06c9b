//! File extension normalization and MIME mapping.

/// Normalize a file extension for use in canonical keys.
///
/// Lowercases and collapses the `jpeg` spelling to `jpg` so that
/// `size_100x100.JPG` and `size_100x100.jpeg` address the same derivative.
///
/// # Examples
///
/// ```
/// use vermeer_core::normalize_ext;
///
/// assert_eq!(normalize_ext("PNG"), "png");
/// assert_eq!(normalize_ext("JPEG"), "jpg");
/// ```
pub fn normalize_ext(ext: &str) -> String {
    let lower = ext.to_ascii_lowercase();
    if lower == "jpeg" {
        "jpg".to_string()
    } else {
        lower
    }
}

/// MIME type implied by a normalized extension.
///
/// Unknown extensions fall back to `application/octet-stream`; whether they
/// are servable at all is decided by the processor registry, not here.
pub fn mime_for_ext(ext: &str) -> &'static str {
    match ext {
        "png" => "image/png",
        "jpg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        "tiff" | "tif" => "image/tiff",
        "avif" => "image/avif",
        _ => "application/octet-stream",
    }
}
