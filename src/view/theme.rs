use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Serializable color representation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum ColorDef {
    /// RGB color as [r, g, b]
    Rgb(u8, u8, u8),
    /// Named color
    Named(String),
}

impl From<ColorDef> for Color {
    fn from(def: ColorDef) -> Self {
        match def {
            ColorDef::Rgb(r, g, b) => Color::Rgb(r, g, b),
            ColorDef::Named(name) => match name.as_str() {
                "Black" => Color::Black,
                "Red" => Color::Red,
                "Green" => Color::Green,
                "Yellow" => Color::Yellow,
                "Blue" => Color::Blue,
                "Magenta" => Color::Magenta,
                "Cyan" => Color::Cyan,
                "Gray" => Color::Gray,
                "DarkGray" => Color::DarkGray,
                "LightYellow" => Color::LightYellow,
                "LightCyan" => Color::LightCyan,
                "White" => Color::White,
                // Default/Reset uses the terminal's default color (preserves transparency)
                "Default" | "Reset" => Color::Reset,
                _ => Color::White,
            },
        }
    }
}

/// Theme file as written on disk; every color is optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ThemeFile {
    #[serde(default)]
    panel_bg: Option<ColorDef>,
    #[serde(default)]
    panel_border: Option<ColorDef>,
    #[serde(default)]
    text: Option<ColorDef>,
    #[serde(default)]
    muted: Option<ColorDef>,
    #[serde(default)]
    module_header: Option<ColorDef>,
    #[serde(default)]
    category_header: Option<ColorDef>,
    #[serde(default)]
    advanced: Option<ColorDef>,
    #[serde(default)]
    selection_bg: Option<ColorDef>,
    #[serde(default)]
    toggle_on: Option<ColorDef>,
    #[serde(default)]
    error: Option<ColorDef>,
    #[serde(default)]
    scrollbar_track: Option<ColorDef>,
    #[serde(default)]
    scrollbar_thumb: Option<ColorDef>,
}

/// Colors used by the settings panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub panel_bg: Color,
    pub panel_border: Color,
    pub text: Color,
    /// Disabled toggles, website markers, hints
    pub muted: Color,
    pub module_header: Color,
    pub category_header: Color,
    /// Names of advanced settings
    pub advanced: Color,
    pub selection_bg: Color,
    pub toggle_on: Color,
    pub error: Color,
    pub scrollbar_track: Color,
    pub scrollbar_thumb: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            panel_bg: Color::Rgb(24, 24, 28),
            panel_border: Color::Gray,
            text: Color::White,
            muted: Color::DarkGray,
            module_header: Color::LightCyan,
            category_header: Color::Yellow,
            advanced: Color::Rgb(255, 242, 171),
            selection_bg: Color::Rgb(48, 64, 96),
            toggle_on: Color::Green,
            error: Color::Red,
            scrollbar_track: Color::DarkGray,
            scrollbar_thumb: Color::Gray,
        }
    }
}

impl Theme {
    /// Parse a theme from JSON. Missing colors keep their default.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let file: ThemeFile = serde_json::from_str(json)?;
        let mut theme = Theme::default();
        let apply = |slot: &mut Color, def: Option<ColorDef>| {
            if let Some(def) = def {
                *slot = def.into();
            }
        };
        apply(&mut theme.panel_bg, file.panel_bg);
        apply(&mut theme.panel_border, file.panel_border);
        apply(&mut theme.text, file.text);
        apply(&mut theme.muted, file.muted);
        apply(&mut theme.module_header, file.module_header);
        apply(&mut theme.category_header, file.category_header);
        apply(&mut theme.advanced, file.advanced);
        apply(&mut theme.selection_bg, file.selection_bg);
        apply(&mut theme.toggle_on, file.toggle_on);
        apply(&mut theme.error, file.error);
        apply(&mut theme.scrollbar_track, file.scrollbar_track);
        apply(&mut theme.scrollbar_thumb, file.scrollbar_thumb);
        Ok(theme)
    }

    /// Load a theme file, falling back to the default theme on any error
    pub fn load_or_default(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Invalid theme {}: {}", path.display(), e);
                Self::default()
            }),
            Err(e) => {
                tracing::warn!("Failed to read theme {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}
