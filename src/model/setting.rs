//! Setting entries and module descriptors
//!
//! A [`SettingEntry`] is one configurable value exposed by a loaded module.
//! Its identity and metadata never change after discovery; the current value
//! is only reachable through the entry's [`SettingAccessor`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// Descriptor of one loaded extension module
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleInfo {
    /// Unique module id (e.g. `com.example.audio`)
    pub id: String,
    /// Human readable name. A leading `!` is a sort hint and is not shown.
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub website: Option<String>,
}

impl ModuleInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: version.into(),
            website: None,
        }
    }

    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }

    /// Name as shown to the user (sort-hint prefix removed)
    pub fn display_name(&self) -> &str {
        self.name.trim_start_matches('!')
    }
}

/// Declared type of a setting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingType {
    Bool,
    Integer,
    Float,
    Text,
    /// One of a fixed list of values
    Choice(Vec<String>),
    /// Key plus modifiers, e.g. `Ctrl+Shift+F1`
    KeyboardShortcut,
    /// A single key, e.g. `F1`
    KeyCode,
    /// `#RRGGBB` or `#RRGGBBAA`
    Color,
    /// Host-defined type; drawers and converters may be registered for it by name
    Custom(String),
}

/// Hashable strategy-map key derived from a [`SettingType`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SettingKind {
    Bool,
    Integer,
    Float,
    Text,
    Choice,
    KeyboardShortcut,
    KeyCode,
    Color,
    Custom(String),
}

impl SettingType {
    pub fn kind(&self) -> SettingKind {
        match self {
            SettingType::Bool => SettingKind::Bool,
            SettingType::Integer => SettingKind::Integer,
            SettingType::Float => SettingKind::Float,
            SettingType::Text => SettingKind::Text,
            SettingType::Choice(_) => SettingKind::Choice,
            SettingType::KeyboardShortcut => SettingKind::KeyboardShortcut,
            SettingType::KeyCode => SettingKind::KeyCode,
            SettingType::Color => SettingKind::Color,
            SettingType::Custom(name) => SettingKind::Custom(name.clone()),
        }
    }

    /// Keyboard shortcuts and key codes are listed under the keybind filter
    pub fn is_keybind(&self) -> bool {
        matches!(self, SettingType::KeyboardShortcut | SettingType::KeyCode)
    }
}

impl fmt::Display for SettingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingType::Bool => write!(f, "bool"),
            SettingType::Integer => write!(f, "integer"),
            SettingType::Float => write!(f, "float"),
            SettingType::Text => write!(f, "text"),
            SettingType::Choice(choices) => write!(f, "choice[{}]", choices.join(", ")),
            SettingType::KeyboardShortcut => write!(f, "keyboard shortcut"),
            SettingType::KeyCode => write!(f, "key code"),
            SettingType::Color => write!(f, "color"),
            SettingType::Custom(name) => write!(f, "{name}"),
        }
    }
}

/// Failure reported by a setting accessor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("setting {0} is no longer available")]
    Unavailable(String),
    #[error("setting {setting} rejected value: {reason}")]
    Rejected { setting: String, reason: String },
}

/// Get/set pair backing a setting's current value.
///
/// Both calls take `&self`; implementations own whatever interior mutability
/// their storage needs.
pub trait SettingAccessor {
    fn get(&self) -> Result<Value, AccessError>;
    fn set(&self, value: Value) -> Result<(), AccessError>;
}

/// Identity used to match exported lines back to entries
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SettingKey {
    pub module_id: String,
    pub category: String,
    pub name: String,
}

impl SettingKey {
    pub fn new(
        module_id: impl Into<String>,
        category: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            module_id: module_id.into(),
            category: category.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.module_id, self.category, self.name)
    }
}

/// A single configurable value with identity, metadata and accessors
pub struct SettingEntry {
    pub module: Rc<ModuleInfo>,
    pub category: String,
    pub name: String,
    pub description: String,
    pub setting_type: SettingType,
    /// `None` when the module declares no default
    pub default: Option<Value>,
    /// Higher values are listed first within a category
    pub order: i32,
    /// Lowest value among a category's entries positions the category
    pub category_order: i32,
    pub advanced: bool,
    pub hide_name: bool,
    pub hide_default_button: bool,
    /// Only listed while the debug toggle is on
    pub debug_only: bool,
    accessor: Box<dyn SettingAccessor>,
}

impl SettingEntry {
    pub fn new(
        module: Rc<ModuleInfo>,
        category: impl Into<String>,
        name: impl Into<String>,
        setting_type: SettingType,
        accessor: Box<dyn SettingAccessor>,
    ) -> Self {
        Self {
            module,
            category: category.into(),
            name: name.into(),
            description: String::new(),
            setting_type,
            default: None,
            order: 0,
            category_order: 0,
            advanced: false,
            hide_name: false,
            hide_default_button: false,
            debug_only: false,
            accessor,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn with_category_order(mut self, category_order: i32) -> Self {
        self.category_order = category_order;
        self
    }

    pub fn advanced(mut self, advanced: bool) -> Self {
        self.advanced = advanced;
        self
    }

    pub fn debug_only(mut self, debug_only: bool) -> Self {
        self.debug_only = debug_only;
        self
    }

    pub fn key(&self) -> SettingKey {
        SettingKey::new(&self.module.id, &self.category, &self.name)
    }

    /// Name as shown to the user (sort-hint prefix removed)
    pub fn display_name(&self) -> &str {
        self.name.trim_start_matches('!')
    }

    pub fn is_keybind(&self) -> bool {
        self.setting_type.is_keybind()
    }

    pub fn get(&self) -> Result<Value, AccessError> {
        self.accessor.get()
    }

    pub fn set(&self, value: Value) -> Result<(), AccessError> {
        self.accessor.set(value)
    }

    /// Write the default back through the setter.
    ///
    /// Returns `Ok(false)` when the entry has no default.
    pub fn reset_to_default(&self) -> Result<bool, AccessError> {
        match &self.default {
            Some(default) => {
                self.accessor.set(default.clone())?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl fmt::Debug for SettingEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingEntry")
            .field("module", &self.module.id)
            .field("category", &self.category)
            .field("name", &self.name)
            .field("setting_type", &self.setting_type)
            .field("default", &self.default)
            .field("order", &self.order)
            .field("category_order", &self.category_order)
            .field("advanced", &self.advanced)
            .finish_non_exhaustive()
    }
}

/// Text form of a value as used by search, export and the generic drawer.
///
/// Strings are written raw (no quotes) and null becomes the empty string.
pub fn stringify_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Value equality where numbers compare by magnitude, so `5` equals `5.0`.
/// Arrays and objects compare element-wise with the same rule.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, v)| y.get(k).is_some_and(|other| values_equal(v, other)))
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;

    struct CellAccessor(RefCell<Value>);

    impl SettingAccessor for CellAccessor {
        fn get(&self) -> Result<Value, AccessError> {
            Ok(self.0.borrow().clone())
        }

        fn set(&self, value: Value) -> Result<(), AccessError> {
            *self.0.borrow_mut() = value;
            Ok(())
        }
    }

    fn entry(value: Value) -> SettingEntry {
        let module = Rc::new(ModuleInfo::new("a.b", "!ModA", "1.0"));
        SettingEntry::new(
            module,
            "General",
            "Volume",
            SettingType::Integer,
            Box::new(CellAccessor(RefCell::new(value))),
        )
    }

    #[test]
    fn test_stringify_value() {
        assert_eq!(stringify_value(&json!("hello")), "hello");
        assert_eq!(stringify_value(&json!(5)), "5");
        assert_eq!(stringify_value(&json!(true)), "true");
        assert_eq!(stringify_value(&json!(1.5)), "1.5");
        assert_eq!(stringify_value(&Value::Null), "");
    }

    #[test]
    fn test_values_equal_compares_numbers_by_value() {
        assert!(values_equal(&json!(5), &json!(5.0)));
        assert!(values_equal(&json!(-2), &json!(-2)));
        assert!(values_equal(&json!([1, {"x": 2.0}]), &json!([1.0, {"x": 2}])));
        assert!(!values_equal(&json!(5), &json!(5.5)));
        assert!(!values_equal(&json!(5), &json!("5")));
        assert!(!values_equal(&json!({"x": 1}), &json!({"y": 1})));
        assert!(values_equal(&json!("a"), &json!("a")));
    }

    #[test]
    fn test_keybind_types() {
        assert!(SettingType::KeyboardShortcut.is_keybind());
        assert!(SettingType::KeyCode.is_keybind());
        assert!(!SettingType::Text.is_keybind());
        assert!(!SettingType::Custom("KeyboardShortcut".into()).is_keybind());
    }

    #[test]
    fn test_choice_kind_ignores_payload() {
        let a = SettingType::Choice(vec!["x".into()]);
        let b = SettingType::Choice(vec!["y".into(), "z".into()]);
        assert_eq!(a.kind(), b.kind());
        assert_ne!(
            SettingType::Custom("A".into()).kind(),
            SettingType::Custom("B".into()).kind()
        );
    }

    #[test]
    fn test_reset_to_default() {
        let e = entry(json!(5)).with_default(json!(10));
        assert_eq!(e.reset_to_default(), Ok(true));
        assert_eq!(e.get().unwrap(), json!(10));

        let no_default = entry(json!(5));
        assert_eq!(no_default.reset_to_default(), Ok(false));
        assert_eq!(no_default.get().unwrap(), json!(5));
    }

    #[test]
    fn test_key_and_display_name() {
        let e = entry(json!(1));
        assert_eq!(e.key(), SettingKey::new("a.b", "General", "Volume"));
        assert_eq!(e.module.display_name(), "ModA");
        assert_eq!(e.key().to_string(), "a.b/General/Volume");
    }

    #[test]
    fn test_setting_type_serde_shape() {
        let t: SettingType = serde_json::from_value(json!("keyboard_shortcut")).unwrap();
        assert_eq!(t, SettingType::KeyboardShortcut);
        let t: SettingType = serde_json::from_value(json!({"choice": ["Low", "High"]})).unwrap();
        assert_eq!(t, SettingType::Choice(vec!["Low".into(), "High".into()]));
    }
}
