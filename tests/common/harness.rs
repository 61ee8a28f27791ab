// Render harness on ratatui's TestBackend

use modconfig::view::settings::{render_settings, SettingsPanel};
use modconfig::view::theme::Theme;
use modconfig::view::ui::PassReport;
use ratatui::backend::TestBackend;
use ratatui::Terminal;

pub struct RenderHarness {
    terminal: Terminal<TestBackend>,
    theme: Theme,
}

impl RenderHarness {
    pub fn new(width: u16, height: u16) -> anyhow::Result<Self> {
        Ok(Self {
            terminal: Terminal::new(TestBackend::new(width, height))?,
            theme: Theme::default(),
        })
    }

    /// Draw one frame of the panel
    pub fn render(&mut self, panel: &mut SettingsPanel) -> anyhow::Result<PassReport> {
        let theme = &self.theme;
        let mut report = PassReport::default();
        self.terminal.draw(|frame| {
            report = render_settings(frame, frame.area(), panel, theme);
        })?;
        Ok(report)
    }

    /// Screen content, one string per row
    pub fn screen(&self) -> Vec<String> {
        let buffer = self.terminal.backend().buffer();
        let area = buffer.area;
        (area.y..area.y + area.height)
            .map(|y| {
                (area.x..area.x + area.width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect()
    }

    pub fn screen_contains(&self, text: &str) -> bool {
        self.screen().iter().any(|row| row.contains(text))
    }

    pub fn assert_screen_contains(&self, text: &str) {
        assert!(
            self.screen_contains(text),
            "expected '{}' on screen:\n{}",
            text,
            self.screen().join("\n")
        );
    }

    pub fn assert_screen_not_contains(&self, text: &str) {
        assert!(
            !self.screen_contains(text),
            "did not expect '{}' on screen:\n{}",
            text,
            self.screen().join("\n")
        );
    }
}
