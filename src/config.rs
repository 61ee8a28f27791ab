use crate::model::keys::KeyCombo;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Persisted panel options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelConfig {
    #[serde(default = "default_false")]
    pub show_advanced: bool,

    #[serde(default = "default_true")]
    pub show_keybinds: bool,

    /// Show entries that are neither advanced nor keybinds
    #[serde(default = "default_true")]
    pub show_settings: bool,

    /// Collapsed state of module groups the user has not toggled
    #[serde(default = "default_true")]
    pub plugin_collapsed_default: bool,

    /// Alphabetical category order; registration order when false
    #[serde(default = "default_true")]
    pub sort_categories_alphabetically: bool,

    /// Omit the category header of modules with a single category
    #[serde(default = "default_false")]
    pub hide_single_sections: bool,

    /// Key that opens and closes the panel, e.g. `F1` or `Ctrl+Shift+O`
    #[serde(default = "default_toggle_hotkey")]
    pub toggle_hotkey: String,
}

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}

fn default_toggle_hotkey() -> String {
    "F1".to_string()
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            show_advanced: false,
            show_keybinds: true,
            show_settings: true,
            plugin_collapsed_default: true,
            sort_categories_alphabetically: true,
            hide_single_sections: false,
            toggle_hotkey: default_toggle_hotkey(),
        }
    }
}

impl PanelConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config: PanelConfig = serde_json::from_str(&contents).map_err(ConfigError::Parse)?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path.as_ref(), contents)?;
        Ok(())
    }

    /// Parsed toggle hotkey
    pub fn hotkey(&self) -> Option<KeyCombo> {
        KeyCombo::parse(&self.toggle_hotkey)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hotkey().is_none() {
            return Err(ConfigError::Validation(format!(
                "toggle_hotkey '{}' is not a key combination",
                self.toggle_hotkey
            )));
        }
        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}
