//! Grouping and sort engine
//!
//! Partitions filtered entries into one [`ModuleGroup`] per module and one
//! [`CategoryGroup`] per category inside it.
//!
//! Ordering rules:
//! - modules by name (ordinal), module id as tie-break
//! - categories by their lowest `category_order`, then by name
//!   (alphabetical mode) or by first appearance, then name (registration
//!   mode)
//! - entries by descending `order`, then display name

use super::filter::CategorySort;
use crate::model::setting::{ModuleInfo, SettingEntry};
use crate::view::ui::VirtualItem;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone)]
pub struct CategoryGroup {
    pub name: String,
    pub settings: Vec<Rc<SettingEntry>>,
}

/// Render unit for one module. Recreated on every rebuild.
#[derive(Debug, Clone)]
pub struct ModuleGroup {
    pub info: Rc<ModuleInfo>,
    pub categories: Vec<CategoryGroup>,
    pub website: Option<String>,
    collapsed: bool,
    /// Rendered height in rows, 0 until measured
    height: u16,
}

impl ModuleGroup {
    pub fn new(
        info: Rc<ModuleInfo>,
        categories: Vec<CategoryGroup>,
        website: Option<String>,
        collapsed: bool,
    ) -> Self {
        Self {
            info,
            categories,
            website,
            collapsed,
            height: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn collapsed(&self) -> bool {
        self.collapsed
    }

    /// Change the collapsed flag. The cached height is dropped so the group
    /// is measured again on the next draw.
    pub fn set_collapsed(&mut self, collapsed: bool) {
        self.collapsed = collapsed;
        self.height = 0;
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// All entries in display order
    pub fn settings(&self) -> impl Iterator<Item = &Rc<SettingEntry>> {
        self.categories.iter().flat_map(|c| c.settings.iter())
    }

    pub fn setting_count(&self) -> usize {
        self.categories.iter().map(|c| c.settings.len()).sum()
    }

    /// Header text: `name version`, with the id appended in debug mode
    pub fn header_text(&self, show_debug: bool) -> String {
        let mut text = self.info.display_name().to_string();
        if !self.info.version.is_empty() {
            text.push(' ');
            text.push_str(&self.info.version);
        }
        if show_debug {
            text.push_str(&format!(" ({})", self.info.id));
        }
        text
    }
}

impl VirtualItem for ModuleGroup {
    fn cached_height(&self) -> u16 {
        self.height
    }

    fn record_height(&mut self, height: u16) {
        self.height = height;
    }
}

/// Build ordered module groups from filtered entries.
///
/// Every group starts expanded; the collapse tracker assigns the real
/// flags afterwards.
pub fn group_entries(entries: &[Rc<SettingEntry>], sort: CategorySort) -> Vec<ModuleGroup> {
    let mut modules: Vec<Vec<Rc<SettingEntry>>> = Vec::new();
    let mut module_index: HashMap<&str, usize> = HashMap::new();
    for entry in entries {
        let idx = *module_index.entry(entry.module.id.as_str()).or_insert_with(|| {
            modules.push(Vec::new());
            modules.len() - 1
        });
        modules[idx].push(entry.clone());
    }

    let mut groups: Vec<ModuleGroup> = modules
        .into_iter()
        .map(|module_entries| build_module_group(module_entries, sort))
        .collect();

    groups.sort_by(|a, b| {
        a.info
            .name
            .cmp(&b.info.name)
            .then_with(|| a.info.id.cmp(&b.info.id))
    });
    groups
}

fn build_module_group(entries: Vec<Rc<SettingEntry>>, sort: CategorySort) -> ModuleGroup {
    let info = entries[0].module.clone();
    let website = entries[0].module.website.clone();

    // (first appearance, name, entries)
    let mut categories: Vec<(usize, String, Vec<Rc<SettingEntry>>)> = Vec::new();
    let mut category_index: HashMap<String, usize> = HashMap::new();
    for entry in entries {
        let idx = match category_index.get(&entry.category) {
            Some(&idx) => idx,
            None => {
                let idx = categories.len();
                category_index.insert(entry.category.clone(), idx);
                categories.push((idx, entry.category.clone(), Vec::new()));
                idx
            }
        };
        categories[idx].2.push(entry);
    }

    let min_order = |settings: &[Rc<SettingEntry>]| {
        settings
            .iter()
            .map(|s| s.category_order)
            .min()
            .unwrap_or(0)
    };

    categories.sort_by(|(a_pos, a_name, a), (b_pos, b_name, b)| {
        let primary = min_order(a).cmp(&min_order(b));
        match sort {
            CategorySort::Alphabetical => primary.then_with(|| a_name.cmp(b_name)),
            CategorySort::Registration => primary
                .then_with(|| a_pos.cmp(b_pos))
                .then_with(|| a_name.cmp(b_name)),
        }
    });

    let categories = categories
        .into_iter()
        .map(|(_, name, mut settings)| {
            settings.sort_by(|a, b| b.order.cmp(&a.order).then_with(|| a.name.cmp(&b.name)));
            CategoryGroup { name, settings }
        })
        .collect();

    ModuleGroup::new(info, categories, website, false)
}
