//! Core data model
//!
//! Setting entries, module descriptors and the discovery seam through which
//! the host hands them to the panel.

pub mod catalog;
pub mod discovery;
pub mod keys;
pub mod setting;

pub use catalog::{CatalogDiscovery, SettingStore};
pub use discovery::{DiscoveredSettings, Discovery, DiscoveryError, SettingsDiscovery};
pub use keys::KeyCombo;
pub use setting::{
    stringify_value, values_equal, AccessError, ModuleInfo, SettingAccessor, SettingEntry, SettingKey,
    SettingKind, SettingType,
};
