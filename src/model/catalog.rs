//! JSON catalog discovery
//!
//! A [`SettingsDiscovery`] backed by a JSON document describing modules and
//! their settings. Current values live in a shared [`SettingStore`], so a
//! fresh discovery run after an import sees the imported values.
//!
//! ```json
//! { "modules": [ { "id": "a.b", "name": "ModA", "version": "1.0",
//!     "settings": [ { "category": "General", "name": "Volume",
//!                     "type": "integer", "value": 5, "default": 10 } ] } ] }
//! ```

use super::discovery::{Discovery, DiscoveryError, SettingsDiscovery};
use super::setting::{AccessError, ModuleInfo, SettingAccessor, SettingEntry, SettingKey, SettingType};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::rc::Rc;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub modules: Vec<CatalogModule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogModule {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub settings: Vec<CatalogSetting>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSetting {
    #[serde(default)]
    pub category: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub setting_type: SettingType,
    pub value: Value,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub category_order: i32,
    #[serde(default)]
    pub advanced: bool,
    #[serde(default)]
    pub hide_name: bool,
    #[serde(default)]
    pub hide_default_button: bool,
    #[serde(default)]
    pub debug_only: bool,
}

/// Shared storage for current values, keyed by setting identity
#[derive(Debug, Clone, Default)]
pub struct SettingStore {
    values: Rc<RefCell<HashMap<SettingKey, Value>>>,
}

impl SettingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &SettingKey) -> Option<Value> {
        self.values.borrow().get(key).cloned()
    }

    pub fn insert(&self, key: SettingKey, value: Value) {
        self.values.borrow_mut().insert(key, value);
    }

    /// Drop a value; later reads through its accessor fail
    pub fn remove(&self, key: &SettingKey) -> Option<Value> {
        self.values.borrow_mut().remove(key)
    }
}

/// Accessor reading and writing one key of a [`SettingStore`]
struct StoreAccessor {
    store: SettingStore,
    key: SettingKey,
    setting_type: SettingType,
}

impl SettingAccessor for StoreAccessor {
    fn get(&self) -> Result<Value, AccessError> {
        self.store
            .get(&self.key)
            .ok_or_else(|| AccessError::Unavailable(self.key.to_string()))
    }

    fn set(&self, value: Value) -> Result<(), AccessError> {
        if !value_fits(&self.setting_type, &value) {
            return Err(AccessError::Rejected {
                setting: self.key.to_string(),
                reason: format!("{value} is not a valid {}", self.setting_type),
            });
        }
        self.store.insert(self.key.clone(), value);
        Ok(())
    }
}

/// Shape check applied by the store before accepting a value
fn value_fits(setting_type: &SettingType, value: &Value) -> bool {
    match setting_type {
        SettingType::Bool => value.is_boolean(),
        SettingType::Integer => value.is_i64() || value.is_u64(),
        SettingType::Float => value.is_number(),
        SettingType::Choice(choices) => value
            .as_str()
            .map(|v| choices.iter().any(|c| c == v))
            .unwrap_or(false),
        SettingType::Text
        | SettingType::KeyboardShortcut
        | SettingType::KeyCode
        | SettingType::Color => value.is_string(),
        SettingType::Custom(_) => true,
    }
}

/// Discovery collaborator reading modules from a JSON catalog
#[derive(Debug, Clone)]
pub struct CatalogDiscovery {
    catalog: CatalogFile,
    store: SettingStore,
}

impl CatalogDiscovery {
    pub fn new(catalog: CatalogFile) -> Self {
        let store = SettingStore::new();
        for module in &catalog.modules {
            for setting in &module.settings {
                store.insert(
                    SettingKey::new(&module.id, &setting.category, &setting.name),
                    setting.value.clone(),
                );
            }
        }
        Self { catalog, store }
    }

    pub fn from_json(json: &str) -> Result<Self, DiscoveryError> {
        let catalog: CatalogFile = serde_json::from_str(json)?;
        Ok(Self::new(catalog))
    }

    pub fn load(path: &Path) -> Result<Self, DiscoveryError> {
        let contents = std::fs::read_to_string(path).map_err(|source| DiscoveryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// Value storage shared by every entry this catalog produces
    pub fn store(&self) -> &SettingStore {
        &self.store
    }
}

impl SettingsDiscovery for CatalogDiscovery {
    fn collect(&self, include_debug: bool) -> Result<Discovery, DiscoveryError> {
        let mut discovery = Discovery::default();
        let mut without_settings = BTreeSet::new();

        for module in &self.catalog.modules {
            let info = Rc::new(ModuleInfo {
                id: module.id.clone(),
                name: module.name.clone(),
                version: module.version.clone(),
                website: module.website.clone(),
            });

            let before = discovery.entries.len();
            for setting in module
                .settings
                .iter()
                .filter(|s| include_debug || !s.debug_only)
            {
                let key = SettingKey::new(&module.id, &setting.category, &setting.name);
                let accessor = StoreAccessor {
                    store: self.store.clone(),
                    key,
                    setting_type: setting.setting_type.clone(),
                };
                let mut entry = SettingEntry::new(
                    info.clone(),
                    &setting.category,
                    &setting.name,
                    setting.setting_type.clone(),
                    Box::new(accessor),
                )
                .with_description(&setting.description)
                .with_order(setting.order)
                .with_category_order(setting.category_order)
                .advanced(setting.advanced)
                .debug_only(setting.debug_only);
                entry.default = setting.default.clone().filter(|d| !d.is_null());
                entry.hide_name = setting.hide_name;
                entry.hide_default_button = setting.hide_default_button;
                discovery.entries.push(Rc::new(entry));
            }

            if discovery.entries.len() == before {
                without_settings.insert(module.name.clone());
            }
        }

        discovery.modules_without_settings = without_settings;
        Ok(discovery)
    }
}
