//! Configuration sections.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the capture service lives and how its frames are presented.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackendConfig {
    /// Base URL of the capture service. Endpoint paths are appended to it.
    /// Default: http://localhost:5000
    #[serde(default = "BackendConfig::default_url")]
    pub url: String,

    /// MIME type used when prefixing preview frames for display.
    /// The service sends bare base64 with no scheme.
    /// Default: image/jpeg
    #[serde(default = "BackendConfig::default_frame_mime")]
    pub frame_mime: String,
}

impl BackendConfig {
    fn default_url() -> String {
        "http://localhost:5000".to_string()
    }

    fn default_frame_mime() -> String {
        "image/jpeg".to_string()
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: Self::default_url(),
            frame_mime: Self::default_frame_mime(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TelemetryConfig {
    /// Log filter directive (trace, debug, info, warn, error, or a full
    /// `tracing_subscriber::EnvFilter` expression).
    /// Default: info
    #[serde(default = "TelemetryConfig::default_log_level")]
    pub log_level: String,
}

impl TelemetryConfig {
    fn default_log_level() -> String {
        "info".to_string()
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
        }
    }
}

/// Local gallery handling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GalleryConfig {
    /// Where `photobooth gallery --download` writes images.
    /// Default: ./photobooth-downloads
    #[serde(default = "GalleryConfig::default_download_dir")]
    pub download_dir: PathBuf,
}

impl GalleryConfig {
    fn default_download_dir() -> PathBuf {
        PathBuf::from("./photobooth-downloads")
    }
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            download_dir: Self::default_download_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_defaults() {
        let backend = BackendConfig::default();
        assert_eq!(backend.url, "http://localhost:5000");
        assert_eq!(backend.frame_mime, "image/jpeg");
    }

    #[test]
    fn test_gallery_defaults() {
        let gallery = GalleryConfig::default();
        assert_eq!(gallery.download_dir, PathBuf::from("./photobooth-downloads"));
    }

    #[test]
    fn test_partial_section_uses_field_defaults() {
        let backend: BackendConfig = toml::from_str("url = \"http://x:1\"").unwrap();
        assert_eq!(backend.url, "http://x:1");
        assert_eq!(backend.frame_mime, "image/jpeg");
    }
}
