//! Loading the engine configuration from disk.

use std::path::{Path, PathBuf};

use linework_core::config::EngineConfig;

/// Why a config file could not be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Loads an engine config from a TOML file.
pub fn load_config(path: &Path) -> Result<EngineConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads the engine config, falling back to defaults if the file is missing
/// or invalid.
pub fn load_or_default(path: &Path) -> EngineConfig {
    match load_config(path) {
        Ok(config) => {
            log::info!(
                "Loaded config {}: animation {} ({} ms, {:?}), max undo {}",
                path.display(),
                if config.animation.enabled { "on" } else { "off" },
                config.animation.duration_ms,
                config.animation.easing,
                config.history.max_undo
            );
            config
        }
        Err(e) => {
            log::warn!("No usable config ({e}), using defaults");
            EngineConfig::default()
        }
    }
}
