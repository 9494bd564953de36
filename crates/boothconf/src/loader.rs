//! Config file discovery, loading, and environment variable overlay.

use crate::{BackendConfig, BoothConfig, ConfigError, GalleryConfig, TelemetryConfig};
use std::env;
use std::path::{Path, PathBuf};

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Discover config files, optionally with a CLI override path.
///
/// If `cli_path` is provided and exists, it replaces the local override.
/// Returns paths in load order (system, user, local/cli). Only returns
/// files that exist.
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let system = PathBuf::from("/etc/photobooth/config.toml");
    if system.exists() {
        files.push(system);
    }

    // XDG_CONFIG_HOME or ~/.config
    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("photobooth/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    if let Some(path) = cli_path {
        if path.exists() {
            files.push(path.to_path_buf());
            return files;
        }
    }

    let local = PathBuf::from("photobooth.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

/// Load config from a TOML file.
pub fn load_from_file(path: &Path) -> Result<BoothConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_toml(&contents, path)
}

fn parse_toml(contents: &str, path: &Path) -> Result<BoothConfig, ConfigError> {
    let table: toml::Table = contents.parse().map_err(|e: toml::de::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut config = BoothConfig::default();

    if let Some(backend) = table.get("backend").and_then(|v| v.as_table()) {
        if let Some(v) = backend.get("url").and_then(|v| v.as_str()) {
            config.backend.url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = backend.get("frame_mime").and_then(|v| v.as_str()) {
            config.backend.frame_mime = v.to_string();
        }
    }

    if let Some(telemetry) = table.get("telemetry").and_then(|v| v.as_table()) {
        if let Some(v) = telemetry.get("log_level").and_then(|v| v.as_str()) {
            config.telemetry.log_level = v.to_string();
        }
    }

    if let Some(gallery) = table.get("gallery").and_then(|v| v.as_table()) {
        if let Some(v) = gallery.get("download_dir").and_then(|v| v.as_str()) {
            config.gallery.download_dir = expand_path(v);
        }
    }

    Ok(config)
}

/// Merge two configs, with non-default `overlay` values taking precedence.
pub fn merge_configs(base: BoothConfig, overlay: BoothConfig) -> BoothConfig {
    let backend_defaults = BackendConfig::default();
    let telemetry_defaults = TelemetryConfig::default();
    let gallery_defaults = GalleryConfig::default();

    BoothConfig {
        backend: BackendConfig {
            url: if overlay.backend.url != backend_defaults.url {
                overlay.backend.url
            } else {
                base.backend.url
            },
            frame_mime: if overlay.backend.frame_mime != backend_defaults.frame_mime {
                overlay.backend.frame_mime
            } else {
                base.backend.frame_mime
            },
        },
        telemetry: TelemetryConfig {
            log_level: if overlay.telemetry.log_level != telemetry_defaults.log_level {
                overlay.telemetry.log_level
            } else {
                base.telemetry.log_level
            },
        },
        gallery: GalleryConfig {
            download_dir: if overlay.gallery.download_dir != gallery_defaults.download_dir {
                overlay.gallery.download_dir
            } else {
                base.gallery.download_dir
            },
        },
    }
}

/// Apply environment variable overrides to config.
pub fn apply_env_overrides(config: &mut BoothConfig, sources: &mut ConfigSources) {
    if let Ok(v) = env::var("PHOTOBOOTH_BACKEND_URL") {
        config.backend.url = v.trim_end_matches('/').to_string();
        sources.env_overrides.push("PHOTOBOOTH_BACKEND_URL".to_string());
    }
    if let Ok(v) = env::var("PHOTOBOOTH_FRAME_MIME") {
        config.backend.frame_mime = v;
        sources.env_overrides.push("PHOTOBOOTH_FRAME_MIME".to_string());
    }

    if let Ok(v) = env::var("PHOTOBOOTH_LOG_LEVEL") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("PHOTOBOOTH_LOG_LEVEL".to_string());
    }
    // RUST_LOG wins over the booth-specific variable
    if let Ok(v) = env::var("RUST_LOG") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("RUST_LOG".to_string());
    }

    if let Ok(v) = env::var("PHOTOBOOTH_DOWNLOAD_DIR") {
        config.gallery.download_dir = expand_path(&v);
        sources.env_overrides.push("PHOTOBOOTH_DOWNLOAD_DIR".to_string());
    }
}

/// Expand `~/` and `$VAR/` prefixes in a path.
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            home.join(stripped)
        } else {
            PathBuf::from(path)
        }
    } else if let Some(stripped) = path.strip_prefix('$') {
        if let Some(slash_pos) = stripped.find('/') {
            let var_name = &stripped[..slash_pos];
            if let Ok(var_value) = env::var(var_name) {
                PathBuf::from(var_value).join(&stripped[slash_pos + 1..])
            } else {
                PathBuf::from(path)
            }
        } else {
            env::var(stripped)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(path))
        }
    } else {
        PathBuf::from(path)
    }
}
