//! Vertical scrollbar for the settings list

use crate::view::theme::Theme;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Paragraph;
use ratatui::Frame;

/// State needed to render a scrollbar
#[derive(Debug, Clone, Copy)]
pub struct ScrollbarState {
    /// Total content rows
    pub total: usize,
    /// Rows visible in the viewport
    pub visible: usize,
    /// First visible row
    pub offset: usize,
}

impl ScrollbarState {
    pub fn new(total: usize, visible: usize, offset: usize) -> Self {
        Self {
            total,
            visible,
            offset,
        }
    }

    /// Thumb position and size for a given track height.
    ///
    /// Returns (thumb_start, thumb_size) in rows
    pub fn thumb_geometry(&self, track_height: usize) -> (usize, usize) {
        if track_height == 0 || self.total == 0 {
            return (0, 0);
        }

        let max_scroll = self.total.saturating_sub(self.visible);
        if max_scroll == 0 {
            return (0, track_height);
        }

        // Minimum 1 row, maximum 80% of the track
        let raw = ((self.visible as f64 / self.total as f64) * track_height as f64).ceil() as usize;
        let max_thumb = (track_height as f64 * 0.8).floor() as usize;
        let thumb_size = raw.max(1).min(max_thumb.max(1)).min(track_height);

        let ratio = self.offset.min(max_scroll) as f64 / max_scroll as f64;
        let thumb_start = (ratio * track_height.saturating_sub(thumb_size) as f64) as usize;

        (thumb_start, thumb_size)
    }
}

/// Render a one-column scrollbar into `area`
pub fn render_scrollbar(frame: &mut Frame, area: Rect, state: &ScrollbarState, theme: &Theme) {
    let height = area.height as usize;
    if height == 0 || area.width == 0 {
        return;
    }

    let (thumb_start, thumb_size) = state.thumb_geometry(height);
    for row in 0..height {
        let cell = Rect::new(area.x, area.y + row as u16, 1, 1);
        // Background fills avoid gaps that box-drawing glyphs leave in some terminals
        let color = if row >= thumb_start && row < thumb_start + thumb_size {
            theme.scrollbar_thumb
        } else {
            theme.scrollbar_track
        };
        frame.render_widget(Paragraph::new(" ").style(Style::default().bg(color)), cell);
    }
}
