//! Settings panel state
//!
//! [`SettingsPanel`] is the single engine instance. It owns the discovered
//! entries, the filter state, the module group list (with its collapsed
//! flags and cached heights) and the scroll position. Every operation runs
//! synchronously on `&mut self`.

use super::collapse;
use super::drawers::DrawerRegistry;
use super::filter::{filter_entries, CategorySort, FilterState, FilterToggle};
use super::grouping::{group_entries, ModuleGroup};
use crate::config::PanelConfig;
use crate::model::discovery::{DiscoveredSettings, DiscoveryError, SettingsDiscovery};
use crate::model::setting::SettingKey;
use crate::services::convert::ConverterRegistry;
use crate::services::transfer::{self, ImportReport, TransferError};
use crate::services::STATUS_TARGET;
use crate::view::ui::{ScrollState, VirtualList};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Banner shown above the module list until a module header was toggled
pub const TIP_TEXT: &str =
    "Click module names to expand their settings. Press Enter on a module to expand or collapse it.";

#[derive(Debug, Error)]
pub enum PanelError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error(transparent)]
    Transfer(#[from] TransferError),
}

/// Message shown in the panel's status line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub is_error: bool,
}

pub struct SettingsPanel {
    discovery: Box<dyn SettingsDiscovery>,
    pub(super) converters: ConverterRegistry,
    pub(super) drawers: DrawerRegistry,
    config: PanelConfig,
    /// Where toggle changes are persisted; `None` keeps them in memory
    config_path: Option<PathBuf>,
    export_path: PathBuf,
    filter: FilterState,
    show_debug: bool,
    discovered: DiscoveredSettings,
    pub(super) groups: Vec<ModuleGroup>,
    pub(super) scroll: ScrollState,
    pub(super) list: VirtualList,
    selected: usize,
    header_clicked: bool,
    open: bool,
    status: Option<StatusLine>,
}

impl std::fmt::Debug for SettingsPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsPanel")
            .field("open", &self.open)
            .field("filter", &self.filter)
            .field("show_debug", &self.show_debug)
            .field("groups", &self.groups.len())
            .field("selected", &self.selected)
            .field("scroll", &self.scroll)
            .finish_non_exhaustive()
    }
}

impl SettingsPanel {
    pub fn new(
        discovery: Box<dyn SettingsDiscovery>,
        config: PanelConfig,
        export_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            discovery,
            converters: ConverterRegistry::with_builtin(),
            drawers: DrawerRegistry::with_builtin(),
            filter: FilterState::from_config(&config),
            config,
            config_path: None,
            export_path: export_path.into(),
            show_debug: false,
            discovered: DiscoveredSettings::default(),
            groups: Vec::new(),
            scroll: ScrollState::default(),
            list: VirtualList::new(),
            selected: 0,
            header_clicked: false,
            open: false,
            status: None,
        }
    }

    /// Persist toggle changes to `path`
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn with_converters(mut self, converters: ConverterRegistry) -> Self {
        self.converters = converters;
        self
    }

    pub fn with_drawers(mut self, drawers: DrawerRegistry) -> Self {
        self.drawers = drawers;
        self
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Run discovery and build the group list
    pub fn open(&mut self) -> Result<(), PanelError> {
        self.rediscover()?;
        self.open = true;
        Ok(())
    }

    /// Hide the panel. The group list and its height cache are dropped and
    /// the scroll position starts over on the next open.
    pub fn close(&mut self) {
        self.open = false;
        self.groups.clear();
        self.discovered = DiscoveredSettings::default();
        self.scroll.reset();
        self.selected = 0;
    }

    pub fn toggle_open(&mut self) -> Result<(), PanelError> {
        if self.open {
            self.close();
            Ok(())
        } else {
            self.open()
        }
    }

    /// Collect entries from the discovery collaborator again, then rebuild.
    /// Collapsed flags survive through the exception set.
    pub fn rediscover(&mut self) -> Result<(), PanelError> {
        let discovery = self.discovery.collect(self.show_debug)?;
        self.discovered = DiscoveredSettings::ingest(discovery);
        self.rebuild();
        Ok(())
    }

    /// Re-run filter and grouping over the discovered entries
    pub fn rebuild(&mut self) {
        let exceptions = collapse::exception_set(&self.groups, self.filter.collapsed_default);
        let filtered = filter_entries(&self.discovered.entries, &self.filter);
        let mut groups = group_entries(&filtered, self.filter.sort);
        collapse::apply_collapse(&mut groups, self.filter.collapsed_default, &exceptions);
        self.groups = groups;
        self.selected = self.selected.min(self.groups.len().saturating_sub(1));

        tracing::debug!(
            "Rebuilt settings list: {} of {} entries in {} modules",
            filtered.len(),
            self.discovered.entries.len(),
            self.groups.len()
        );
    }

    // =========================================================================
    // Filtering
    // =========================================================================

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    pub fn search(&self) -> &str {
        &self.filter.search
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        let search = search.into();
        if search == self.filter.search {
            return;
        }
        self.filter.search = search;
        self.rebuild();
    }

    pub fn push_search_char(&mut self, c: char) {
        let mut search = self.filter.search.clone();
        search.push(c);
        self.set_search(search);
    }

    pub fn pop_search_char(&mut self) {
        let mut search = self.filter.search.clone();
        if search.pop().is_some() {
            self.set_search(search);
        }
    }

    pub fn clear_search(&mut self) {
        self.set_search(String::new());
    }

    /// Change one filter toggle. Persisted toggles are written to the
    /// config file; no rediscovery takes place.
    pub fn set_toggle(&mut self, toggle: FilterToggle, value: bool) {
        if self.filter.toggle(toggle) == value {
            return;
        }
        self.filter.set_toggle(toggle, value);
        match toggle {
            FilterToggle::Settings => self.config.show_settings = value,
            FilterToggle::Keybinds => self.config.show_keybinds = value,
            FilterToggle::Advanced => self.config.show_advanced = value,
            FilterToggle::OnlyChanged => {}
        }
        if toggle != FilterToggle::OnlyChanged {
            self.persist_config();
        }
        self.rebuild();
    }

    pub fn flip_toggle(&mut self, toggle: FilterToggle) {
        let value = !self.filter.toggle(toggle);
        self.set_toggle(toggle, value);
    }

    pub fn show_debug(&self) -> bool {
        self.show_debug
    }

    /// Debug mode lists debug-only entries, so it needs a fresh discovery
    pub fn set_show_debug(&mut self, show_debug: bool) -> Result<(), PanelError> {
        if self.show_debug == show_debug {
            return Ok(());
        }
        self.show_debug = show_debug;
        self.rediscover()
    }

    pub fn set_sort(&mut self, sort: CategorySort) {
        if self.filter.sort == sort {
            return;
        }
        self.filter.sort = sort;
        self.config.sort_categories_alphabetically = sort == CategorySort::Alphabetical;
        self.persist_config();
        self.rebuild();
    }

    pub fn toggle_sort(&mut self) {
        let sort = match self.filter.sort {
            CategorySort::Alphabetical => CategorySort::Registration,
            CategorySort::Registration => CategorySort::Alphabetical,
        };
        self.set_sort(sort);
    }

    fn persist_config(&self) {
        let Some(path) = &self.config_path else {
            return;
        };
        if let Err(e) = self.config.save_to_file(path) {
            tracing::warn!("Failed to save config to {}: {}", path.display(), e);
        }
    }

    // =========================================================================
    // Groups and collapse state
    // =========================================================================

    pub fn groups(&self) -> &[ModuleGroup] {
        &self.groups
    }

    pub fn discovered(&self) -> &DiscoveredSettings {
        &self.discovered
    }

    pub fn group_index(&self, module_id: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.info.id == module_id)
    }

    /// Whether `group` is drawn with its settings visible
    pub fn is_expanded(&self, group: &ModuleGroup) -> bool {
        self.filter.is_searching() || !group.collapsed()
    }

    /// Toggle the collapse flag of one group. Ignored while searching, when
    /// every group is shown expanded. Returns whether anything changed.
    pub fn toggle_collapse(&mut self, index: usize) -> bool {
        if self.filter.is_searching() {
            return false;
        }
        let Some(group) = self.groups.get_mut(index) else {
            return false;
        };
        collapse::toggle_collapse(group);
        self.header_clicked = true;
        true
    }

    /// Expand-all / collapse-all. The new default is persisted and the tip
    /// counts as seen.
    pub fn collapse_all(&mut self) -> bool {
        let collapsed = collapse::collapse_all(&mut self.groups, &mut self.filter);
        self.header_clicked = true;
        self.config.plugin_collapsed_default = collapsed;
        self.persist_config();
        collapsed
    }

    pub fn header_clicked(&self) -> bool {
        self.header_clicked
    }

    /// Banner text, if one is shown above the module list
    pub fn tip(&self) -> Option<&'static str> {
        if self.filter.is_searching() || self.header_clicked {
            None
        } else {
            Some(TIP_TEXT)
        }
    }

    /// Rows above the first group in the current state
    pub fn header_height(&self) -> u16 {
        if self.tip().is_some() {
            self.list.header_height()
        } else {
            0
        }
    }

    // =========================================================================
    // Selection and scrolling
    // =========================================================================

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_group(&self) -> Option<&ModuleGroup> {
        self.groups.get(self.selected)
    }

    pub fn select(&mut self, index: usize) {
        if index < self.groups.len() {
            self.selected = index;
            self.ensure_selected_visible();
        }
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.groups.len() {
            self.select(self.selected + 1);
        }
    }

    pub fn select_prev(&mut self) {
        if self.selected > 0 {
            self.select(self.selected - 1);
        }
    }

    /// Content row where group `index` starts, from cached heights
    pub fn group_offset(&self, index: usize) -> u16 {
        self.groups
            .iter()
            .take(index)
            .fold(self.header_height(), |offset, g| offset.saturating_add(g.height()))
    }

    fn ensure_selected_visible(&mut self) {
        let Some(group) = self.groups.get(self.selected) else {
            return;
        };
        // Unmeasured groups count as their header row
        let height = group.height().max(1);
        let offset = self.group_offset(self.selected);
        self.scroll.ensure_visible(offset, height);
    }

    pub fn scroll_state(&self) -> &ScrollState {
        &self.scroll
    }

    pub fn scroll_by(&mut self, delta: i32) {
        self.scroll.scroll_by(delta);
    }

    pub fn page_up(&mut self) {
        self.scroll.page_up();
    }

    pub fn page_down(&mut self) {
        self.scroll.page_down();
    }

    // =========================================================================
    // Export, import and reset
    // =========================================================================

    pub fn export_path(&self) -> &Path {
        &self.export_path
    }

    /// Write every visible entry to the export artifact
    pub fn export(&mut self) -> Result<usize, PanelError> {
        match transfer::export_to_file(&self.groups, &self.converters, &self.export_path) {
            Ok(count) => Ok(count),
            Err(e) => {
                tracing::error!(target: STATUS_TARGET, "Failed to export: {}", e);
                Err(e.into())
            }
        }
    }

    /// Apply the export artifact to the visible entries, then discover
    /// again so every value is read back fresh
    pub fn import(&mut self) -> Result<ImportReport, PanelError> {
        let report = match transfer::import_from_file(
            &self.groups,
            &self.converters,
            &self.export_path,
        ) {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(target: STATUS_TARGET, "Failed to import: {}", e);
                return Err(e.into());
            }
        };
        self.rediscover()?;
        Ok(report)
    }

    /// Set every entry of group `index` that has a default back to it.
    /// Returns the number of entries reset.
    pub fn reset_module(&mut self, index: usize) -> usize {
        let Some(group) = self.groups.get(index) else {
            return 0;
        };
        let mut count = 0;
        for entry in group.settings() {
            match entry.reset_to_default() {
                Ok(true) => count += 1,
                Ok(false) => {}
                Err(e) => tracing::warn!("Failed to reset {}: {}", entry.key(), e),
            }
        }
        tracing::info!(
            target: STATUS_TARGET,
            "Reset {} settings of {}",
            count,
            group.info.display_name()
        );
        self.rebuild();
        count
    }

    /// Reset a single entry. Returns `false` when it is not listed or has no
    /// default.
    pub fn reset_entry(&mut self, key: &SettingKey) -> bool {
        let entry = self
            .discovered
            .entries
            .iter()
            .find(|e| e.key() == *key)
            .cloned();
        let Some(entry) = entry else {
            return false;
        };
        match entry.reset_to_default() {
            Ok(reset) => {
                if reset {
                    self.rebuild();
                }
                reset
            }
            Err(e) => {
                tracing::warn!("Failed to reset {}: {}", key, e);
                false
            }
        }
    }

    // =========================================================================
    // Status line
    // =========================================================================

    pub fn status(&self) -> Option<&StatusLine> {
        self.status.as_ref()
    }

    pub fn set_status(&mut self, text: impl Into<String>, is_error: bool) {
        self.status = Some(StatusLine {
            text: text.into(),
            is_error,
        });
    }
}
