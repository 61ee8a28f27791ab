//! Settings panel input handling

use super::filter::FilterToggle;
use super::state::{PanelError, SettingsPanel};
use crate::model::keys::KeyCombo;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Panel actions a key press can trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelCommand {
    /// Open or close the panel (configurable hotkey)
    TogglePanel,
    Close,
    SearchChar(char),
    SearchBackspace,
    ClearSearch,
    FlipToggle(FilterToggle),
    FlipDebug,
    CollapseAll,
    ToggleSort,
    Export,
    Import,
    SelectNext,
    SelectPrev,
    ToggleSelected,
    ResetSelected,
    PageUp,
    PageDown,
}

/// Translate a key press.
///
/// While the panel is closed only the hotkey is recognized.
pub fn map_key(key: &KeyEvent, hotkey: &KeyCombo, open: bool) -> Option<PanelCommand> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if hotkey.matches(key) {
        return Some(PanelCommand::TogglePanel);
    }
    if !open {
        return None;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    let command = match key.code {
        KeyCode::Esc => PanelCommand::Close,
        KeyCode::Up => PanelCommand::SelectPrev,
        KeyCode::Down => PanelCommand::SelectNext,
        KeyCode::PageUp => PanelCommand::PageUp,
        KeyCode::PageDown => PanelCommand::PageDown,
        KeyCode::Enter => PanelCommand::ToggleSelected,
        KeyCode::Backspace => PanelCommand::SearchBackspace,
        KeyCode::Char(c) if ctrl => match c.to_ascii_lowercase() {
            'u' => PanelCommand::ClearSearch,
            'e' => PanelCommand::CollapseAll,
            's' => PanelCommand::ToggleSort,
            'x' => PanelCommand::Export,
            'i' => PanelCommand::Import,
            'r' => PanelCommand::ResetSelected,
            _ => return None,
        },
        KeyCode::Char(c) if alt => match c {
            '1' => PanelCommand::FlipToggle(FilterToggle::Settings),
            '2' => PanelCommand::FlipToggle(FilterToggle::Keybinds),
            '3' => PanelCommand::FlipToggle(FilterToggle::Advanced),
            '4' => PanelCommand::FlipDebug,
            '5' => PanelCommand::FlipToggle(FilterToggle::OnlyChanged),
            _ => return None,
        },
        KeyCode::Char(c) => PanelCommand::SearchChar(c),
        _ => return None,
    };
    Some(command)
}

impl SettingsPanel {
    /// Toggle hotkey from config, `F1` when it does not parse
    pub fn hotkey(&self) -> KeyCombo {
        self.config()
            .hotkey()
            .unwrap_or(KeyCombo::new(KeyCode::F(1), KeyModifiers::NONE))
    }

    /// Input-phase hook. Returns whether the key was consumed.
    ///
    /// Export and import failures are reported on the status channel and
    /// swallowed; discovery failures propagate.
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<bool, PanelError> {
        let Some(command) = map_key(&key, &self.hotkey(), self.is_open()) else {
            return Ok(false);
        };
        self.apply(command)?;
        Ok(true)
    }

    pub fn apply(&mut self, command: PanelCommand) -> Result<(), PanelError> {
        match command {
            PanelCommand::TogglePanel => self.toggle_open()?,
            PanelCommand::Close => self.close(),
            PanelCommand::SearchChar(c) => self.push_search_char(c),
            PanelCommand::SearchBackspace => self.pop_search_char(),
            PanelCommand::ClearSearch => self.clear_search(),
            PanelCommand::FlipToggle(toggle) => self.flip_toggle(toggle),
            PanelCommand::FlipDebug => {
                let show = !self.show_debug();
                self.set_show_debug(show)?;
            }
            PanelCommand::CollapseAll => {
                self.collapse_all();
            }
            PanelCommand::ToggleSort => self.toggle_sort(),
            PanelCommand::Export => {
                if let Err(e) = self.export() {
                    tracing::debug!("Export aborted: {}", e);
                }
            }
            PanelCommand::Import => match self.import() {
                Ok(_) => {}
                Err(PanelError::Transfer(e)) => tracing::debug!("Import aborted: {}", e),
                Err(e) => return Err(e),
            },
            PanelCommand::SelectNext => self.select_next(),
            PanelCommand::SelectPrev => self.select_prev(),
            PanelCommand::ToggleSelected => {
                self.toggle_collapse(self.selected());
            }
            PanelCommand::ResetSelected => {
                self.reset_module(self.selected());
            }
            PanelCommand::PageUp => self.page_up(),
            PanelCommand::PageDown => self.page_down(),
        }
        Ok(())
    }
}
