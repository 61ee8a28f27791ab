//! Height-cached virtualized list
//!
//! Draws only the items that intersect the viewport while keeping the total
//! scrollable extent correct:
//!
//! - Every item caches its rendered height; `0` means "never measured".
//! - An unmeasured item is always drawn so it can be measured.
//! - A measured item outside the viewport is replaced by a placeholder of
//!   exactly its cached height, so nothing is instantiated for it.
//! - Drawing an item may fail with a [`DrawFault`]. The item is skipped for
//!   this pass, keeps height `0` and is measured again on the next pass.
//!
//! The list knows nothing about what an item looks like; an [`ItemPainter`]
//! supplied by the caller does the actual drawing.

use thiserror::Error;

/// Item with a cached rendered height
pub trait VirtualItem {
    /// Cached height in rows, `0` when not measured yet
    fn cached_height(&self) -> u16;

    /// Store the height measured on the first real draw
    fn record_height(&mut self, height: u16);
}

/// Transient layout failure while drawing one item
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrawFault {
    #[error("mismatched layout nesting in {item}: {open} section(s) left open")]
    UnclosedSection { item: String, open: usize },
    #[error("mismatched layout nesting in {item}: section closed without being opened")]
    UnopenedSection { item: String },
}

/// Visible window in content coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    pub top: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(top: u16, height: u16) -> Self {
        Self { top, height }
    }

    /// Whether an item at `offset` with cached `height` must be drawn.
    ///
    /// Unmeasured items (height 0) always are.
    pub fn needs_draw(&self, offset: u16, height: u16) -> bool {
        height == 0
            || (offset.saturating_add(height) >= self.top
                && offset <= self.top.saturating_add(self.height))
    }
}

/// Drawing backend for a [`VirtualList`] pass
pub trait ItemPainter<I> {
    /// Fully draw `item` at content row `offset`, returning its height
    fn draw(&mut self, index: usize, item: &I, offset: u16) -> Result<u16, DrawFault>;

    /// Reserve `height` empty rows at `offset` instead of drawing the item
    fn placeholder(&mut self, _index: usize, _height: u16, _offset: u16) {}
}

/// What a single pass did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Items drawn in full
    pub drawn: Vec<usize>,
    /// Items replaced by a placeholder
    pub placeholders: Vec<usize>,
    /// Items skipped because their draw faulted
    pub faulted: Vec<usize>,
    /// Content row right after the last item (before the trailer)
    pub items_end: u16,
    /// Total scrollable extent: header, items and trailer
    pub content_height: u16,
}

/// Virtualization engine. Holds the once-measured header height.
#[derive(Debug, Clone, Default)]
pub struct VirtualList {
    header_height: Option<u16>,
}

impl VirtualList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Header (tips banner) height, `0` until measured
    pub fn header_height(&self) -> u16 {
        self.header_height.unwrap_or(0)
    }

    pub fn header_measured(&self) -> bool {
        self.header_height.is_some()
    }

    /// Record the header height. Only the first measurement is kept.
    pub fn measure_header(&mut self, height: u16) {
        if self.header_height.is_none() {
            self.header_height = Some(height);
        }
    }

    /// Forget the header measurement
    pub fn reset(&mut self) {
        self.header_height = None;
    }

    /// Run one pass over `items`.
    ///
    /// `header` is the number of rows above the first item (0 when the
    /// header is not shown), `trailer` the number of rows reserved after the
    /// last item.
    pub fn pass<I, P>(
        &self,
        items: &mut [I],
        header: u16,
        trailer: u16,
        viewport: Viewport,
        painter: &mut P,
    ) -> PassReport
    where
        I: VirtualItem,
        P: ItemPainter<I>,
    {
        let mut report = PassReport::default();
        let mut offset = header;

        for (index, item) in items.iter_mut().enumerate() {
            let cached = item.cached_height();

            if viewport.needs_draw(offset, cached) {
                match painter.draw(index, item, offset) {
                    Ok(measured) => {
                        if cached == 0 {
                            item.record_height(measured);
                        }
                        report.drawn.push(index);
                    }
                    Err(fault) => {
                        tracing::warn!("Skipping item {} this frame: {}", index, fault);
                        report.faulted.push(index);
                    }
                }
            } else {
                painter.placeholder(index, cached, offset);
                report.placeholders.push(index);
            }

            offset = offset.saturating_add(item.cached_height());
        }

        report.items_end = offset;
        report.content_height = offset.saturating_add(trailer);
        report
    }
}
