//! Discovery seam
//!
//! The host enumerates settings of its loaded modules and hands them over as
//! plain [`SettingEntry`] records through [`SettingsDiscovery`]. The panel
//! never looks inside modules itself.

use super::setting::{SettingEntry, SettingKey};
use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;
use std::rc::Rc;
use thiserror::Error;

/// Raw output of a discovery run
#[derive(Debug, Default)]
pub struct Discovery {
    /// Entries in registration order
    pub entries: Vec<Rc<SettingEntry>>,
    /// Names of loaded modules that expose no (listable) setting
    pub modules_without_settings: BTreeSet<String>,
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("discovery failed: {0}")]
    Other(String),
}

/// External collaborator enumerating all settings of all loaded modules.
///
/// Called when the panel opens, when the debug toggle flips and after an
/// import; never once per frame.
pub trait SettingsDiscovery {
    fn collect(&self, include_debug: bool) -> Result<Discovery, DiscoveryError>;
}

/// Discovery output as the panel keeps it between rebuilds
#[derive(Debug, Default)]
pub struct DiscoveredSettings {
    pub entries: Vec<Rc<SettingEntry>>,
    /// Display names, `!` prefix trimmed, sorted
    pub modules_without_settings: Vec<String>,
}

impl DiscoveredSettings {
    /// Adapt a discovery run.
    ///
    /// A second entry with an already seen (module, category, name) key is
    /// dropped so that every key maps to exactly one entry.
    pub fn ingest(discovery: Discovery) -> Self {
        let mut seen: HashSet<SettingKey> = HashSet::with_capacity(discovery.entries.len());
        let mut entries = Vec::with_capacity(discovery.entries.len());
        for entry in discovery.entries {
            if seen.insert(entry.key()) {
                entries.push(entry);
            } else {
                tracing::warn!("Ignoring duplicate setting {}", entry.key());
            }
        }

        let mut modules_without_settings: Vec<String> = discovery
            .modules_without_settings
            .iter()
            .map(|name| name.trim_start_matches('!').to_string())
            .collect();
        modules_without_settings.sort();

        tracing::debug!(
            "Discovered {} settings, {} modules without settings",
            entries.len(),
            modules_without_settings.len()
        );

        Self {
            entries,
            modules_without_settings,
        }
    }

    /// Comma separated list for the debug footer
    pub fn modules_without_settings_label(&self) -> String {
        self.modules_without_settings.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::setting::{AccessError, ModuleInfo, SettingAccessor, SettingType};
    use serde_json::{json, Value};

    struct Fixed;

    impl SettingAccessor for Fixed {
        fn get(&self) -> Result<Value, AccessError> {
            Ok(json!(1))
        }

        fn set(&self, _value: Value) -> Result<(), AccessError> {
            Ok(())
        }
    }

    fn entry(module: &Rc<ModuleInfo>, name: &str) -> Rc<SettingEntry> {
        Rc::new(SettingEntry::new(
            module.clone(),
            "General",
            name,
            SettingType::Integer,
            Box::new(Fixed),
        ))
    }

    #[test]
    fn test_ingest_drops_duplicate_keys() {
        let module = Rc::new(ModuleInfo::new("a.b", "ModA", "1.0"));
        let discovery = Discovery {
            entries: vec![
                entry(&module, "Volume"),
                entry(&module, "Pitch"),
                entry(&module, "Volume"),
            ],
            modules_without_settings: BTreeSet::new(),
        };

        let settings = DiscoveredSettings::ingest(discovery);
        let names: Vec<&str> = settings.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Volume", "Pitch"]);
    }

    #[test]
    fn test_modules_without_settings_trimmed_and_sorted() {
        let discovery = Discovery {
            entries: Vec::new(),
            modules_without_settings: ["Zeta", "!Alpha", "Mid"]
                .into_iter()
                .map(String::from)
                .collect(),
        };

        let settings = DiscoveredSettings::ingest(discovery);
        assert_eq!(settings.modules_without_settings, vec!["Alpha", "Mid", "Zeta"]);
        assert_eq!(settings.modules_without_settings_label(), "Alpha, Mid, Zeta");
    }
}
