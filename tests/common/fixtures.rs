// Panel fixtures

use modconfig::config::PanelConfig;
use modconfig::config_io::DirectoryContext;
use modconfig::model::catalog::CatalogFile;
use modconfig::model::{CatalogDiscovery, SettingKey, SettingStore};
use modconfig::services::convert::ConverterRegistry;
use modconfig::view::settings::{DrawerRegistry, SettingsPanel};
use serde_json::Value;
use tempfile::TempDir;

/// Two modules: ModA with one changed setting, ModB without settings
pub const BASIC_CATALOG: &str = r#"{
    "modules": [
        { "id": "a.b", "name": "ModA", "version": "1.0", "settings": [
            { "category": "General", "name": "Volume", "type": "integer", "value": 5, "default": 10 }
        ] },
        { "id": "c.d", "name": "ModB", "version": "1.0", "settings": [] }
    ]
}"#;

/// A panel over a catalog, with its config and export file in a temp dir
pub struct PanelFixture {
    _temp_dir: TempDir,
    pub dirs: DirectoryContext,
    pub store: SettingStore,
    pub panel: SettingsPanel,
}

impl PanelFixture {
    pub fn new(catalog_json: &str) -> anyhow::Result<Self> {
        Self::with_discovery(CatalogDiscovery::from_json(catalog_json)?)
    }

    pub fn from_value(catalog: Value) -> anyhow::Result<Self> {
        let catalog: CatalogFile = serde_json::from_value(catalog)?;
        Self::with_discovery(CatalogDiscovery::new(catalog))
    }

    fn with_discovery(discovery: CatalogDiscovery) -> anyhow::Result<Self> {
        super::tracing::init_tracing_from_env();
        let temp_dir = tempfile::tempdir()?;
        let dirs = DirectoryContext::for_testing(temp_dir.path());
        let store = discovery.store().clone();
        let panel = SettingsPanel::new(
            Box::new(discovery),
            PanelConfig::default(),
            dirs.export_path(),
        )
        .with_config_path(dirs.config_path());
        Ok(Self {
            _temp_dir: temp_dir,
            dirs,
            store,
            panel,
        })
    }

    pub fn with_drawers(mut self, drawers: DrawerRegistry) -> Self {
        self.panel = self.panel.with_drawers(drawers);
        self
    }

    pub fn with_converters(mut self, converters: ConverterRegistry) -> Self {
        self.panel = self.panel.with_converters(converters);
        self
    }

    /// Open the panel, panicking on discovery failure
    pub fn opened(mut self) -> Self {
        self.panel.open().unwrap();
        self
    }

    pub fn value(&self, module_id: &str, category: &str, name: &str) -> Option<Value> {
        self.store.get(&SettingKey::new(module_id, category, name))
    }

    pub fn set_value(&self, module_id: &str, category: &str, name: &str, value: Value) {
        self.store
            .insert(SettingKey::new(module_id, category, name), value);
    }

    /// Names of listed entries, in display order
    pub fn listed(&self) -> Vec<String> {
        self.panel
            .groups()
            .iter()
            .flat_map(|g| g.settings().map(|s| s.name.clone()))
            .collect()
    }

    pub fn read_export(&self) -> anyhow::Result<String> {
        Ok(std::fs::read_to_string(self.dirs.export_path())?)
    }

    pub fn write_export(&self, contents: &str) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.dirs.config_dir)?;
        std::fs::write(self.dirs.export_path(), contents)?;
        Ok(())
    }
}
