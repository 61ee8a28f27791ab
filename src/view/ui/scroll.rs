//! Row-based scroll state for variable-height content

use super::scrollbar::ScrollbarState;
use super::virtual_list::Viewport;

/// Pure scroll state - knows nothing about content
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollState {
    /// Scroll offset in rows
    pub offset: u16,
    /// Viewport height
    pub viewport: u16,
    /// Total content height
    pub content_height: u16,
}

impl ScrollState {
    pub fn new(viewport: u16) -> Self {
        Self {
            offset: 0,
            viewport,
            content_height: 0,
        }
    }

    /// Update viewport height (panel resized)
    pub fn set_viewport(&mut self, height: u16) {
        self.viewport = height;
        self.clamp_offset();
    }

    /// Update content height (call after every render pass)
    pub fn set_content_height(&mut self, height: u16) {
        self.content_height = height;
        self.clamp_offset();
    }

    pub fn max_offset(&self) -> u16 {
        self.content_height.saturating_sub(self.viewport)
    }

    fn clamp_offset(&mut self) {
        self.offset = self.offset.min(self.max_offset());
    }

    /// Scroll to ensure a region is visible.
    /// If the region is taller than the viewport, shows its top.
    pub fn ensure_visible(&mut self, y: u16, height: u16) {
        if y < self.offset {
            self.offset = y;
        } else if y.saturating_add(height) > self.offset.saturating_add(self.viewport) {
            if height > self.viewport {
                self.offset = y;
            } else {
                self.offset = y + height - self.viewport;
            }
        }
        self.clamp_offset();
    }

    /// Scroll by delta rows (positive = down, negative = up)
    pub fn scroll_by(&mut self, delta: i32) {
        let target = (self.offset as i32 + delta).clamp(0, u16::MAX as i32);
        self.offset = target as u16;
        self.clamp_offset();
    }

    pub fn page_up(&mut self) {
        self.scroll_by(-(self.viewport.max(1) as i32));
    }

    pub fn page_down(&mut self) {
        self.scroll_by(self.viewport.max(1) as i32);
    }

    pub fn reset(&mut self) {
        self.offset = 0;
    }

    /// Visible window for a virtualization pass
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.offset, self.viewport)
    }

    pub fn needs_scrollbar(&self) -> bool {
        self.content_height > self.viewport
    }

    pub fn to_scrollbar_state(&self) -> ScrollbarState {
        ScrollbarState::new(
            self.content_height as usize,
            self.viewport as usize,
            self.offset as usize,
        )
    }
}
