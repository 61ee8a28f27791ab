//! Reusable list infrastructure: scroll state, scrollbar and the
//! virtualized list engine

pub mod scroll;
pub mod scrollbar;
pub mod virtual_list;

pub use scroll::ScrollState;
pub use scrollbar::{render_scrollbar, ScrollbarState};
pub use virtual_list::{DrawFault, ItemPainter, PassReport, Viewport, VirtualItem, VirtualList};
