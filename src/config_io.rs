//! Runtime configuration I/O operations.
//!
//! System directory detection and config loading. Needs the `dirs` runtime
//! dependency, so it lives apart from config.rs.

use crate::config::{ConfigError, PanelConfig};
use crate::services::transfer::EXPORT_FILE_NAME;
use std::path::{Path, PathBuf};

/// File name of the persisted panel options
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Directory paths for configuration, export artifact and logs
///
/// Only the top-level `main` function should use `dirs::*` to construct this;
/// all other code receives it by parameter passing, so tests can point it at
/// a temp directory.
#[derive(Debug, Clone)]
pub struct DirectoryContext {
    /// Config directory, e.g. ~/.config/modconfig on Linux
    pub config_dir: PathBuf,

    /// Data directory for logs, e.g. ~/.local/share/modconfig on Linux
    pub data_dir: PathBuf,
}

impl DirectoryContext {
    /// Create a DirectoryContext from the system directories
    /// This should ONLY be called from main()
    pub fn from_system() -> std::io::Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "Could not determine config directory",
                )
            })?
            .join("modconfig");

        // Logs fall back to the config directory on systems without a data dir
        let data_dir = dirs::data_dir()
            .map(|dir| dir.join("modconfig"))
            .unwrap_or_else(|| config_dir.clone());

        Ok(Self {
            config_dir,
            data_dir,
        })
    }

    /// Use `config_dir` for everything, e.g. from `--config-dir`
    pub fn with_config_dir(config_dir: impl Into<PathBuf>) -> Self {
        let config_dir = config_dir.into();
        Self {
            data_dir: config_dir.clone(),
            config_dir,
        }
    }

    /// Create a DirectoryContext for testing with a temp directory
    pub fn for_testing(temp_dir: &Path) -> Self {
        Self {
            config_dir: temp_dir.join("config"),
            data_dir: temp_dir.join("data"),
        }
    }

    /// Get the config file path
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }

    /// Get the export/import artifact path
    pub fn export_path(&self) -> PathBuf {
        self.config_dir.join(EXPORT_FILE_NAME)
    }

    /// Get the optional theme file path
    pub fn theme_path(&self) -> PathBuf {
        self.config_dir.join("theme.json")
    }

    /// Get the default log file path
    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("logs").join("modconfig.log")
    }
}

/// Load the panel config from `dir_context`.
///
/// A missing file yields the defaults. A file that fails to parse or
/// validate is reported and replaced by the defaults too.
pub fn load_config(dir_context: &DirectoryContext) -> PanelConfig {
    let path = dir_context.config_path();
    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return PanelConfig::default();
    }
    match PanelConfig::load_from_file(&path).and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => {
            tracing::info!("Loaded config from {}", path.display());
            config
        }
        Err(e) => {
            tracing::warn!("Ignoring config {}: {}", path.display(), e);
            PanelConfig::default()
        }
    }
}

/// Persist the panel config, creating the config directory when needed
pub fn save_config(dir_context: &DirectoryContext, config: &PanelConfig) -> Result<(), ConfigError> {
    config.save_to_file(dir_context.config_path())
}
