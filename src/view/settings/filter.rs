//! Filter engine
//!
//! Decides which entries are eligible for display. Two modes:
//!
//! - **Search**: the search string has at least one whitespace-separated
//!   token. An entry is kept when every token occurs (case-insensitively) in
//!   its searchable text. Toggle filters are ignored.
//! - **Toggles**: advanced / keybind / normal-setting toggles apply.
//!
//! "Only changed" applies on top of either mode.

use crate::config::PanelConfig;
use crate::model::setting::{stringify_value, values_equal, SettingEntry};
use serde_json::Value;
use std::rc::Rc;

/// How categories are ordered inside a module
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategorySort {
    /// By category name
    #[default]
    Alphabetical,
    /// By first appearance in discovery order
    Registration,
}

/// The user-controlled filter toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterToggle {
    /// Entries that are neither advanced nor keybinds
    Settings,
    Keybinds,
    Advanced,
    OnlyChanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub search: String,
    pub show_advanced: bool,
    pub show_keybinds: bool,
    pub show_settings: bool,
    pub only_changed: bool,
    /// Collapsed state new module groups start with
    pub collapsed_default: bool,
    pub sort: CategorySort,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search: String::new(),
            show_advanced: false,
            show_keybinds: true,
            show_settings: true,
            only_changed: false,
            collapsed_default: true,
            sort: CategorySort::Alphabetical,
        }
    }
}

impl FilterState {
    /// Initial state from persisted configuration
    pub fn from_config(config: &PanelConfig) -> Self {
        Self {
            search: String::new(),
            show_advanced: config.show_advanced,
            show_keybinds: config.show_keybinds,
            show_settings: config.show_settings,
            only_changed: false,
            collapsed_default: config.plugin_collapsed_default,
            sort: if config.sort_categories_alphabetically {
                CategorySort::Alphabetical
            } else {
                CategorySort::Registration
            },
        }
    }

    pub fn search_tokens(&self) -> Vec<&str> {
        self.search.split_whitespace().collect()
    }

    pub fn is_searching(&self) -> bool {
        self.search.split_whitespace().next().is_some()
    }

    pub fn toggle(&self, toggle: FilterToggle) -> bool {
        match toggle {
            FilterToggle::Settings => self.show_settings,
            FilterToggle::Keybinds => self.show_keybinds,
            FilterToggle::Advanced => self.show_advanced,
            FilterToggle::OnlyChanged => self.only_changed,
        }
    }

    pub fn set_toggle(&mut self, toggle: FilterToggle, value: bool) {
        match toggle {
            FilterToggle::Settings => self.show_settings = value,
            FilterToggle::Keybinds => self.show_keybinds = value,
            FilterToggle::Advanced => self.show_advanced = value,
            FilterToggle::OnlyChanged => self.only_changed = value,
        }
    }
}

/// Text a search token is matched against.
///
/// Fields are joined with newlines so a token never matches across two
/// fields.
pub fn search_text(entry: &SettingEntry, current: &Value) -> String {
    let default = entry
        .default
        .as_ref()
        .map(stringify_value)
        .unwrap_or_default();
    [
        entry.module.name.as_str(),
        entry.module.id.as_str(),
        entry.name.as_str(),
        entry.category.as_str(),
        entry.description.as_str(),
        default.as_str(),
        stringify_value(current).as_str(),
    ]
    .join("\n")
}

/// Every token occurs in the entry's searchable text, ignoring case.
/// `tokens` must already be lower-cased.
pub fn matches_search(entry: &SettingEntry, current: &Value, tokens: &[String]) -> bool {
    let haystack = search_text(entry, current).to_lowercase();
    tokens.iter().all(|token| haystack.contains(token.as_str()))
}

/// Toggle filters used when not searching
pub fn passes_toggles(entry: &SettingEntry, state: &FilterState) -> bool {
    let keybind = entry.is_keybind();
    if !state.show_advanced && entry.advanced {
        return false;
    }
    if !state.show_keybinds && keybind {
        return false;
    }
    if !state.show_settings && !(entry.advanced || keybind) {
        return false;
    }
    true
}

/// Entry has a default and its current value differs from it
pub fn is_changed(entry: &SettingEntry, current: &Value) -> bool {
    match &entry.default {
        Some(default) => !values_equal(default, current),
        None => false,
    }
}

/// Entries eligible for display, in input order.
///
/// Every entry's current value is read once; an entry whose accessor fails
/// is left out of this pass without affecting the others.
pub fn filter_entries(entries: &[Rc<SettingEntry>], state: &FilterState) -> Vec<Rc<SettingEntry>> {
    let tokens: Vec<String> = state
        .search_tokens()
        .into_iter()
        .map(str::to_lowercase)
        .collect();
    let searching = !tokens.is_empty();

    let mut kept = Vec::with_capacity(entries.len());
    for entry in entries {
        let current = match entry.get() {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!("Excluding {} from this pass: {}", entry.key(), e);
                continue;
            }
        };

        let visible = if searching {
            matches_search(entry, &current, &tokens)
        } else {
            passes_toggles(entry, state)
        };
        if !visible {
            continue;
        }
        if state.only_changed && !is_changed(entry, &current) {
            continue;
        }
        kept.push(entry.clone());
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::setting::{AccessError, ModuleInfo, SettingAccessor, SettingType};
    use serde_json::json;

    struct Fixed(Value);

    impl SettingAccessor for Fixed {
        fn get(&self) -> Result<Value, AccessError> {
            Ok(self.0.clone())
        }

        fn set(&self, _value: Value) -> Result<(), AccessError> {
            Ok(())
        }
    }

    struct Broken;

    impl SettingAccessor for Broken {
        fn get(&self) -> Result<Value, AccessError> {
            Err(AccessError::Unavailable("broken".into()))
        }

        fn set(&self, _value: Value) -> Result<(), AccessError> {
            Err(AccessError::Unavailable("broken".into()))
        }
    }

    fn module() -> Rc<ModuleInfo> {
        Rc::new(ModuleInfo::new("a.b", "ModA", "1.0"))
    }

    fn entry(name: &str, setting_type: SettingType, value: Value) -> SettingEntry {
        SettingEntry::new(module(), "General", name, setting_type, Box::new(Fixed(value)))
    }

    fn names(entries: &[Rc<SettingEntry>]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    fn sample() -> Vec<Rc<SettingEntry>> {
        vec![
            Rc::new(
                entry("Volume", SettingType::Integer, json!(5))
                    .with_default(json!(10))
                    .with_description("Master output level"),
            ),
            Rc::new(entry("Debug overlay", SettingType::Bool, json!(false)).advanced(true)),
            Rc::new(entry("Toggle key", SettingType::KeyCode, json!("F2"))),
            Rc::new(entry("Pitch", SettingType::Float, json!(1.0)).with_default(json!(1.0))),
        ]
    }

    #[test]
    fn test_default_toggles_hide_advanced() {
        let result = filter_entries(&sample(), &FilterState::default());
        assert_eq!(names(&result), vec!["Volume", "Toggle key", "Pitch"]);
    }

    #[test]
    fn test_hide_keybinds() {
        let state = FilterState {
            show_keybinds: false,
            ..FilterState::default()
        };
        assert_eq!(names(&filter_entries(&sample(), &state)), vec!["Volume", "Pitch"]);
    }

    #[test]
    fn test_hide_settings_keeps_advanced_and_keybinds() {
        let state = FilterState {
            show_settings: false,
            show_advanced: true,
            ..FilterState::default()
        };
        assert_eq!(
            names(&filter_entries(&sample(), &state)),
            vec!["Debug overlay", "Toggle key"]
        );
    }

    #[test]
    fn test_search_ignores_toggles_and_case() {
        let state = FilterState {
            search: "DEBUG".into(),
            ..FilterState::default()
        };
        assert_eq!(names(&filter_entries(&sample(), &state)), vec!["Debug overlay"]);
    }

    #[test]
    fn test_search_requires_every_token() {
        let state = FilterState {
            search: "  master   volume ".into(),
            ..FilterState::default()
        };
        assert_eq!(names(&filter_entries(&sample(), &state)), vec!["Volume"]);

        let state = FilterState {
            search: "master pitch".into(),
            ..FilterState::default()
        };
        assert!(filter_entries(&sample(), &state).is_empty());
    }

    #[test]
    fn test_search_matches_values_module_and_id() {
        let by_value = FilterState {
            search: "f2".into(),
            ..FilterState::default()
        };
        assert_eq!(names(&filter_entries(&sample(), &by_value)), vec!["Toggle key"]);

        let by_default = FilterState {
            search: "10".into(),
            ..FilterState::default()
        };
        assert_eq!(names(&filter_entries(&sample(), &by_default)), vec!["Volume"]);

        let by_id = FilterState {
            search: "a.b".into(),
            ..FilterState::default()
        };
        assert_eq!(filter_entries(&sample(), &by_id).len(), 4);
    }

    #[test]
    fn test_search_does_not_span_fields() {
        // module name "ModA" followed by id "a.b": "moda.b" only exists across the boundary
        let state = FilterState {
            search: "moda.b".into(),
            ..FilterState::default()
        };
        assert!(filter_entries(&sample(), &state).is_empty());
    }

    #[test]
    fn test_whitespace_only_search_uses_toggles() {
        let state = FilterState {
            search: " \t ".into(),
            ..FilterState::default()
        };
        assert!(!state.is_searching());
        assert_eq!(filter_entries(&sample(), &state).len(), 3);
    }

    #[test]
    fn test_only_changed() {
        let state = FilterState {
            only_changed: true,
            show_advanced: true,
            ..FilterState::default()
        };
        // Debug overlay and Toggle key have no default; Pitch equals its default
        assert_eq!(names(&filter_entries(&sample(), &state)), vec!["Volume"]);
    }

    #[test]
    fn test_whole_float_equals_integer_default() {
        let entries = vec![
            Rc::new(entry("Scale", SettingType::Float, json!(5)).with_default(json!(5.0))),
            Rc::new(entry("Ratio", SettingType::Float, json!(0.5)).with_default(json!(1))),
        ];
        let state = FilterState {
            only_changed: true,
            ..FilterState::default()
        };
        assert_eq!(names(&filter_entries(&entries, &state)), vec!["Ratio"]);
    }

    #[test]
    fn test_only_changed_applies_while_searching() {
        let state = FilterState {
            search: "a.b".into(),
            only_changed: true,
            ..FilterState::default()
        };
        assert_eq!(names(&filter_entries(&sample(), &state)), vec!["Volume"]);
    }

    #[test]
    fn test_failing_accessor_is_isolated() {
        let mut entries = sample();
        entries.insert(
            1,
            Rc::new(SettingEntry::new(
                module(),
                "General",
                "Broken",
                SettingType::Integer,
                Box::new(Broken),
            )),
        );
        let result = filter_entries(&entries, &FilterState::default());
        assert_eq!(names(&result), vec!["Volume", "Toggle key", "Pitch"]);
    }

    #[test]
    fn test_from_config() {
        let config = PanelConfig {
            show_advanced: true,
            sort_categories_alphabetically: false,
            ..PanelConfig::default()
        };
        let state = FilterState::from_config(&config);
        assert!(state.show_advanced);
        assert_eq!(state.sort, CategorySort::Registration);
        assert!(state.collapsed_default);
    }
}
