//! Setting drawers
//!
//! A drawer turns one entry and its current value into terminal lines on a
//! [`GroupCanvas`]. Drawers are looked up per [`SettingKind`]; kinds without
//! a registered drawer use the generic value drawer.
//!
//! The canvas tracks section nesting. A drawer that opens a section and
//! fails before closing it leaves the canvas unbalanced, which faults the
//! whole module group for the current frame (see
//! [`crate::view::ui::virtual_list`]).

use crate::model::keys::KeyCombo;
use crate::model::setting::{
    stringify_value, values_equal, AccessError, SettingEntry, SettingKind, SettingType,
};
use crate::view::theme::Theme;
use crate::view::ui::DrawFault;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Line drawn in place of an entry whose drawer failed
pub const DRAW_FAILED_TEXT: &str = "Failed to draw this field, check log for details.";

const SECTION_INDENT: usize = 2;

/// Per-entry drawing failure. Never faults the group on its own.
#[derive(Debug, Error)]
pub enum DrawError {
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error("expected {expected}, got {value}")]
    UnexpectedValue { expected: &'static str, value: Value },
    #[error("{0}")]
    Other(String),
}

/// Line buffer for one module group
#[derive(Debug, Default)]
pub struct GroupCanvas {
    lines: Vec<Line<'static>>,
    depth: usize,
    unopened_close: bool,
}

impl GroupCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a nested section. Lines pushed inside are indented.
    pub fn begin_section(&mut self) {
        self.depth += 1;
    }

    pub fn end_section(&mut self) {
        if self.depth == 0 {
            self.unopened_close = true;
        } else {
            self.depth -= 1;
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn push_line(&mut self, line: Line<'static>) {
        if self.depth == 0 {
            self.lines.push(line);
            return;
        }
        let mut spans = Vec::with_capacity(line.spans.len() + 1);
        spans.push(Span::raw(" ".repeat(self.depth * SECTION_INDENT)));
        spans.extend(line.spans);
        self.lines.push(Line::from(spans).style(line.style));
    }

    pub fn height(&self) -> u16 {
        u16::try_from(self.lines.len()).unwrap_or(u16::MAX)
    }

    /// Hand out the drawn lines, or the layout fault if sections do not
    /// balance
    pub fn finish(self, item: &str) -> Result<Vec<Line<'static>>, DrawFault> {
        if self.unopened_close {
            return Err(DrawFault::UnopenedSection {
                item: item.to_string(),
            });
        }
        if self.depth != 0 {
            return Err(DrawFault::UnclosedSection {
                item: item.to_string(),
                open: self.depth,
            });
        }
        Ok(self.lines)
    }
}

/// Everything a drawer gets to see about one entry
pub struct DrawContext<'a> {
    pub entry: &'a SettingEntry,
    pub value: &'a Value,
    pub theme: &'a Theme,
    /// Width the name column is padded to
    pub label_width: usize,
}

impl DrawContext<'_> {
    /// Name column, colored for advanced entries. Empty for `hide_name`.
    pub fn label(&self) -> Vec<Span<'static>> {
        if self.entry.hide_name {
            return Vec::new();
        }
        let color = if self.entry.advanced {
            self.theme.advanced
        } else {
            self.theme.text
        };
        vec![
            Span::styled(
                format!("{:width$}", self.entry.display_name(), width = self.label_width),
                Style::default().fg(color),
            ),
            Span::styled(": ", Style::default().fg(color)),
        ]
    }

    /// Reset marker, shown for entries with a default unless hidden
    pub fn reset_marker(&self) -> Option<Span<'static>> {
        let default = self.entry.default.as_ref()?;
        if self.entry.hide_default_button {
            return None;
        }
        let style = if values_equal(default, self.value) {
            Style::default().fg(self.theme.muted)
        } else {
            Style::default().fg(self.theme.text)
        };
        Some(Span::styled("  [reset]", style))
    }

    /// Full entry line: name column, the drawer's value spans, reset marker
    pub fn line(&self, value: Vec<Span<'static>>) -> Line<'static> {
        let mut spans = self.label();
        spans.extend(value);
        spans.extend(self.reset_marker());
        Line::from(spans)
    }
}

pub trait SettingDrawer {
    fn draw(&self, ctx: &DrawContext<'_>, canvas: &mut GroupCanvas) -> Result<(), DrawError>;
}

/// Fallback: stringified value
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueDrawer;

impl SettingDrawer for ValueDrawer {
    fn draw(&self, ctx: &DrawContext<'_>, canvas: &mut GroupCanvas) -> Result<(), DrawError> {
        let text = stringify_value(ctx.value);
        canvas.push_line(ctx.line(vec![Span::styled(
            text,
            Style::default().fg(ctx.theme.text),
        )]));
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ToggleDrawer;

impl SettingDrawer for ToggleDrawer {
    fn draw(&self, ctx: &DrawContext<'_>, canvas: &mut GroupCanvas) -> Result<(), DrawError> {
        let Value::Bool(checked) = ctx.value else {
            return Err(DrawError::UnexpectedValue {
                expected: "a boolean",
                value: ctx.value.clone(),
            });
        };
        let (checkbox, color) = if *checked {
            ("[x]", ctx.theme.toggle_on)
        } else {
            ("[ ]", ctx.theme.muted)
        };
        canvas.push_line(ctx.line(vec![Span::styled(checkbox, Style::default().fg(color))]));
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ChoiceDrawer;

impl SettingDrawer for ChoiceDrawer {
    fn draw(&self, ctx: &DrawContext<'_>, canvas: &mut GroupCanvas) -> Result<(), DrawError> {
        let current = stringify_value(ctx.value);
        let mut value = vec![Span::styled(
            format!("< {} >", current),
            Style::default().fg(ctx.theme.text),
        )];
        if let SettingType::Choice(choices) = &ctx.entry.setting_type {
            if let Some(pos) = choices.iter().position(|c| *c == current) {
                value.push(Span::styled(
                    format!(" {}/{}", pos + 1, choices.len()),
                    Style::default().fg(ctx.theme.muted),
                ));
            }
        }
        canvas.push_line(ctx.line(value));
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ColorDrawer;

impl SettingDrawer for ColorDrawer {
    fn draw(&self, ctx: &DrawContext<'_>, canvas: &mut GroupCanvas) -> Result<(), DrawError> {
        let Value::String(text) = ctx.value else {
            return Err(DrawError::UnexpectedValue {
                expected: "a color string",
                value: ctx.value.clone(),
            });
        };
        let swatch = parse_hex_color(text).ok_or_else(|| DrawError::UnexpectedValue {
            expected: "#RRGGBB or #RRGGBBAA",
            value: ctx.value.clone(),
        })?;
        canvas.push_line(ctx.line(vec![
            Span::styled("██", Style::default().fg(swatch)),
            Span::raw(" "),
            Span::styled(text.clone(), Style::default().fg(ctx.theme.text)),
        ]));
        Ok(())
    }
}

/// Shortcuts and single keys, shown in canonical `Ctrl+Alt+Key` form when
/// they parse
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyDrawer;

impl SettingDrawer for KeyDrawer {
    fn draw(&self, ctx: &DrawContext<'_>, canvas: &mut GroupCanvas) -> Result<(), DrawError> {
        let raw = stringify_value(ctx.value);
        let shown = match KeyCombo::parse(&raw) {
            Some(combo) => combo.to_string(),
            None if raw.is_empty() => "(none)".to_string(),
            None => raw,
        };
        canvas.push_line(ctx.line(vec![Span::styled(
            format!("[{}]", shown),
            Style::default()
                .fg(ctx.theme.text)
                .add_modifier(Modifier::BOLD),
        )]));
        Ok(())
    }
}

fn parse_hex_color(text: &str) -> Option<Color> {
    let hex = text.strip_prefix('#')?;
    if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
}

/// Strategy map from setting kind to drawer
pub struct DrawerRegistry {
    drawers: HashMap<SettingKind, Box<dyn SettingDrawer>>,
    fallback: Box<dyn SettingDrawer>,
}

impl std::fmt::Debug for DrawerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawerRegistry")
            .field("kinds", &self.drawers.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Default for DrawerRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

impl DrawerRegistry {
    /// Registry where every kind uses the generic drawer
    pub fn empty() -> Self {
        Self {
            drawers: HashMap::new(),
            fallback: Box::new(ValueDrawer),
        }
    }

    pub fn with_builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(SettingKind::Bool, Box::new(ToggleDrawer));
        registry.register(SettingKind::Choice, Box::new(ChoiceDrawer));
        registry.register(SettingKind::Color, Box::new(ColorDrawer));
        registry.register(SettingKind::KeyboardShortcut, Box::new(KeyDrawer));
        registry.register(SettingKind::KeyCode, Box::new(KeyDrawer));
        registry
    }

    /// Register a drawer. A kind that already has one keeps it; returns
    /// whether the drawer was added.
    pub fn register(&mut self, kind: SettingKind, drawer: Box<dyn SettingDrawer>) -> bool {
        if self.drawers.contains_key(&kind) {
            tracing::warn!("Drawer for {:?} already registered, ignoring", kind);
            return false;
        }
        self.drawers.insert(kind, drawer);
        true
    }

    pub fn has_drawer(&self, kind: &SettingKind) -> bool {
        self.drawers.contains_key(kind)
    }

    pub fn resolve(&self, setting_type: &SettingType) -> &dyn SettingDrawer {
        self.drawers
            .get(&setting_type.kind())
            .map(|d| d.as_ref())
            .unwrap_or(self.fallback.as_ref())
    }

    /// Draw one entry. A failing read or drawer is replaced by the error
    /// line; only the canvas nesting can still fault the group.
    pub fn draw_entry(
        &self,
        entry: &SettingEntry,
        theme: &Theme,
        label_width: usize,
        canvas: &mut GroupCanvas,
    ) {
        let result = entry.get().map_err(DrawError::from).and_then(|value| {
            let ctx = DrawContext {
                entry,
                value: &value,
                theme,
                label_width,
            };
            self.resolve(&entry.setting_type).draw(&ctx, canvas)
        });

        if let Err(e) = result {
            tracing::warn!("Failed to draw {}: {}", entry.key(), e);
            canvas.push_line(Line::from(Span::styled(
                DRAW_FAILED_TEXT,
                Style::default().fg(theme.error),
            )));
        }
    }
}
