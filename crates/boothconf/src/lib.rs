//! Configuration loading for the photobooth client.
//!
//! Only values that describe *where* the capture service lives and how the
//! client presents itself are configurable. The status poll cadence is a
//! fixed property of the client and deliberately absent here.
//!
//! # Usage
//!
//! ```rust,no_run
//! use boothconf::BoothConfig;
//!
//! let config = BoothConfig::load().expect("Failed to load config");
//! println!("Capture service: {}", config.backend.url);
//! ```
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins):
//! 1. `/etc/photobooth/config.toml` (system)
//! 2. `~/.config/photobooth/config.toml` (user)
//! 3. `./photobooth.toml` (local override, or `--config <path>`)
//! 4. Environment variables (`PHOTOBOOTH_*`, `RUST_LOG`)
//!
//! # Example Config
//!
//! ```toml
//! [backend]
//! url = "http://booth.local:5000"
//! frame_mime = "image/jpeg"
//!
//! [telemetry]
//! log_level = "debug"
//!
//! [gallery]
//! download_dir = "~/Pictures/photobooth"
//! ```

pub mod loader;
pub mod sections;

pub use loader::{discover_config_files_with_override, expand_path, ConfigSources};
pub use sections::{BackendConfig, GalleryConfig, TelemetryConfig};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Complete photobooth client configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct BoothConfig {
    /// Capture service location and frame presentation.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Logging.
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// Local gallery handling.
    #[serde(default)]
    pub gallery: GalleryConfig,
}

impl BoothConfig {
    /// Load configuration from all sources.
    pub fn load() -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(None)?;
        Ok(config)
    }

    /// Load configuration with `config_path` replacing the local
    /// `./photobooth.toml` override. System and user configs still load first.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(config_path)?;
        Ok(config)
    }

    /// Load configuration from optional path and return information about sources.
    pub fn load_with_sources_from(
        config_path: Option<&Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut config = BoothConfig::default();

        for path in loader::discover_config_files_with_override(config_path) {
            let file_config = loader::load_from_file(&path)?;
            config = loader::merge_configs(config, file_config);
            sources.files.push(path);
        }

        loader::apply_env_overrides(&mut config, &mut sources);

        Ok((config, sources))
    }

    /// Serialize config to TOML string.
    pub fn to_toml(&self) -> String {
        let mut output = String::new();

        output.push_str("# Photobooth Configuration\n\n");

        output.push_str("[backend]\n");
        output.push_str(&format!("url = \"{}\"\n", self.backend.url));
        output.push_str(&format!("frame_mime = \"{}\"\n", self.backend.frame_mime));

        output.push_str("\n[telemetry]\n");
        output.push_str(&format!(
            "log_level = \"{}\"\n",
            self.telemetry.log_level
        ));

        output.push_str("\n[gallery]\n");
        output.push_str(&format!(
            "download_dir = \"{}\"\n",
            self.gallery.download_dir.display()
        ));

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BoothConfig::default();
        assert_eq!(config.backend.url, "http://localhost:5000");
        assert_eq!(config.backend.frame_mime, "image/jpeg");
        assert_eq!(config.telemetry.log_level, "info");
    }

    #[test]
    fn test_to_toml() {
        let config = BoothConfig::default();
        let toml = config.to_toml();
        assert!(toml.contains("[backend]"));
        assert!(toml.contains("[telemetry]"));
        assert!(toml.contains("[gallery]"));
        assert!(toml.contains("http://localhost:5000"));
    }

    #[test]
    fn test_to_toml_parses_back() {
        let mut config = BoothConfig::default();
        config.backend.url = "http://booth:8000".to_string();
        config.telemetry.log_level = "debug".to_string();

        let parsed: BoothConfig = toml::from_str(&config.to_toml()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_load_from_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("booth.toml");
        std::fs::write(
            &path,
            "[backend]\nurl = \"http://10.0.0.7:5000\"\n",
        )
        .unwrap();

        let (config, sources) = BoothConfig::load_with_sources_from(Some(&path)).unwrap();
        assert!(sources.files.contains(&path));
        // env overrides may be present on the machine running the tests
        if !sources.env_overrides.iter().any(|v| v == "PHOTOBOOTH_BACKEND_URL") {
            assert_eq!(config.backend.url, "http://10.0.0.7:5000");
        }
    }

    #[test]
    fn test_load_from_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[backend\nurl = ").unwrap();

        let err = BoothConfig::load_from(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
