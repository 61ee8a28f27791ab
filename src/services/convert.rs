//! Value converters
//!
//! Strategy map from [`SettingKind`] to a text <-> value converter. Only the
//! export/import codec uses it; a type without a converter is skipped on
//! import.

use crate::model::keys::{parse_key_code, KeyCombo};
use crate::model::setting::{stringify_value, SettingKind, SettingType};
use serde_json::{Number, Value};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error("'{0}' is not a boolean")]
    InvalidBool(String),
    #[error("'{text}' is not a valid {kind}")]
    InvalidNumber { text: String, kind: &'static str },
    #[error("'{value}' is not one of: {choices}")]
    NotAChoice { value: String, choices: String },
    #[error("'{0}' is not a key combination")]
    InvalidKey(String),
    #[error("'{0}' is not a #RRGGBB or #RRGGBBAA color")]
    InvalidColor(String),
    #[error("cannot convert '{text}' to {setting_type}")]
    Unsupported { text: String, setting_type: String },
}

pub type ToText = fn(&Value) -> String;
pub type FromText = fn(&str, &SettingType) -> Result<Value, ConvertError>;

/// Text conversion pair for one setting kind
#[derive(Clone, Copy)]
pub struct Converter {
    pub to_text: ToText,
    pub from_text: FromText,
}

impl std::fmt::Debug for Converter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converter").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConverterRegistry {
    converters: HashMap<SettingKind, Converter>,
}

impl ConverterRegistry {
    /// Registry without any converter
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with converters for every built-in setting type
    pub fn with_builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(SettingKind::Bool, plain(parse_bool));
        registry.register(SettingKind::Integer, plain(parse_integer));
        registry.register(SettingKind::Float, plain(parse_float));
        registry.register(SettingKind::Text, plain(parse_text));
        registry.register(SettingKind::Choice, plain(parse_choice));
        registry.register(SettingKind::KeyboardShortcut, plain(parse_shortcut));
        registry.register(SettingKind::KeyCode, plain(parse_single_key));
        registry.register(SettingKind::Color, plain(parse_color));
        registry
    }

    /// Add or replace the converter for a kind
    pub fn register(&mut self, kind: SettingKind, converter: Converter) {
        self.converters.insert(kind, converter);
    }

    pub fn resolve(&self, setting_type: &SettingType) -> Option<&Converter> {
        self.converters.get(&setting_type.kind())
    }

    /// Text form of a value, falling back to the generic form when no
    /// converter is registered
    pub fn to_text(&self, setting_type: &SettingType, value: &Value) -> String {
        match self.resolve(setting_type) {
            Some(converter) => (converter.to_text)(value),
            None => stringify_value(value),
        }
    }
}

/// Converter writing the generic text form
fn plain(from_text: FromText) -> Converter {
    Converter {
        to_text: stringify_value,
        from_text,
    }
}

fn parse_bool(text: &str, _: &SettingType) -> Result<Value, ConvertError> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(Value::Bool(true)),
        "false" => Ok(Value::Bool(false)),
        _ => Err(ConvertError::InvalidBool(text.to_string())),
    }
}

fn parse_integer(text: &str, _: &SettingType) -> Result<Value, ConvertError> {
    text.trim()
        .parse::<i64>()
        .map(Value::from)
        .map_err(|_| ConvertError::InvalidNumber {
            text: text.to_string(),
            kind: "integer",
        })
}

/// Whole numbers written without a fraction or exponent stay integers, so a
/// stored `5` reads back as `5` and not `5.0`.
fn parse_float(text: &str, _: &SettingType) -> Result<Value, ConvertError> {
    let trimmed = text.trim();
    if !trimmed.contains(['.', 'e', 'E']) {
        if let Ok(whole) = trimmed.parse::<i64>() {
            return Ok(Value::from(whole));
        }
    }
    trimmed
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| ConvertError::InvalidNumber {
            text: text.to_string(),
            kind: "float",
        })
}

fn parse_text(text: &str, _: &SettingType) -> Result<Value, ConvertError> {
    Ok(Value::String(text.to_string()))
}

fn parse_choice(text: &str, setting_type: &SettingType) -> Result<Value, ConvertError> {
    let SettingType::Choice(choices) = setting_type else {
        return Err(ConvertError::Unsupported {
            text: text.to_string(),
            setting_type: setting_type.to_string(),
        });
    };
    let wanted = text.trim();
    choices
        .iter()
        .find(|c| c.as_str() == wanted)
        .or_else(|| choices.iter().find(|c| c.eq_ignore_ascii_case(wanted)))
        .map(|c| Value::String(c.clone()))
        .ok_or_else(|| ConvertError::NotAChoice {
            value: text.to_string(),
            choices: choices.join(", "),
        })
}

/// Validated, then kept in the spelling it was written in
fn parse_shortcut(text: &str, _: &SettingType) -> Result<Value, ConvertError> {
    let trimmed = text.trim();
    KeyCombo::parse(trimmed)
        .map(|_| Value::String(trimmed.to_string()))
        .ok_or_else(|| ConvertError::InvalidKey(text.to_string()))
}

fn parse_single_key(text: &str, _: &SettingType) -> Result<Value, ConvertError> {
    let trimmed = text.trim();
    if trimmed.contains('+') && trimmed.len() > 1 {
        return Err(ConvertError::InvalidKey(text.to_string()));
    }
    parse_key_code(trimmed)
        .map(|_| Value::String(trimmed.to_string()))
        .ok_or_else(|| ConvertError::InvalidKey(text.to_string()))
}

fn parse_color(text: &str, _: &SettingType) -> Result<Value, ConvertError> {
    let trimmed = text.trim();
    let valid = trimmed
        .strip_prefix('#')
        .map(|hex| (hex.len() == 6 || hex.len() == 8) && hex.chars().all(|c| c.is_ascii_hexdigit()))
        .unwrap_or(false);
    if valid {
        Ok(Value::String(trimmed.to_string()))
    } else {
        Err(ConvertError::InvalidColor(text.to_string()))
    }
}
