//! Server configuration.

use std::time::Duration;
use vermeer_processor::ResizeMode;

/// Default extension allowlist for uploads.
const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp"];

/// Configuration for the Vermeer server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind, e.g. "0.0.0.0:8080"
    pub bind_addr: String,
    /// Root directory for blob storage
    pub media_root: String,
    /// Optional bearer token required on uploads; `None` disables the check
    pub upload_token: Option<String>,
    /// Extensions accepted on upload (normalized lowercase)
    pub allowed_extensions: Vec<String>,
    /// Aspect-ratio policy for the `size` processor
    pub resize_mode: ResizeMode,
    /// Wall-clock budget for a single transform
    pub transform_timeout: Duration,
}

impl ServerConfig {
    /// Create a configuration with defaults for everything but the paths.
    pub fn new(bind_addr: impl Into<String>, media_root: impl Into<String>) -> Self {
        Self {
            bind_addr: bind_addr.into(),
            media_root: media_root.into(),
            upload_token: None,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            resize_mode: ResizeMode::Stretch,
            transform_timeout: Duration::from_secs(30),
        }
    }

    /// Create config from environment variables.
    ///
    /// Reads:
    /// - `VERMEER_BIND_ADDR` (default: "0.0.0.0:8080")
    /// - `VERMEER_MEDIA_ROOT` (default: "./media")
    /// - `VERMEER_UPLOAD_TOKEN` (optional)
    /// - `VERMEER_ALLOWED_EXTENSIONS` (optional, comma-separated)
    /// - `VERMEER_RESIZE_MODE` (optional: "stretch", "fit", or "crop")
    /// - `VERMEER_TRANSFORM_TIMEOUT_SECS` (optional)
    pub fn from_env() -> Self {
        let bind_addr =
            std::env::var("VERMEER_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let media_root =
            std::env::var("VERMEER_MEDIA_ROOT").unwrap_or_else(|_| "./media".to_string());

        let mut config = Self::new(bind_addr, media_root);
        config.upload_token = std::env::var("VERMEER_UPLOAD_TOKEN").ok();

        if let Ok(exts) = std::env::var("VERMEER_ALLOWED_EXTENSIONS") {
            config.allowed_extensions = exts
                .split(',')
                .map(|s| s.trim().to_ascii_lowercase())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(mode) = std::env::var("VERMEER_RESIZE_MODE")
            && let Ok(mode) = mode.parse::<ResizeMode>()
        {
            config.resize_mode = mode;
        }
        if let Ok(secs) = std::env::var("VERMEER_TRANSFORM_TIMEOUT_SECS")
            && let Ok(secs) = secs.parse::<u64>()
        {
            config.transform_timeout = Duration::from_secs(secs);
        }

        config
    }

    /// Set the upload bearer token.
    pub fn with_upload_token(mut self, token: impl Into<String>) -> Self {
        self.upload_token = Some(token.into());
        self
    }
}
