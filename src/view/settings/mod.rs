//! Settings panel
//!
//! Pipeline: discovered entries → [`filter`] → [`grouping`] → [`collapse`]
//! flags → virtualized drawing in [`render`].

pub mod collapse;
pub mod drawers;
pub mod filter;
pub mod grouping;
pub mod input;
pub mod render;
pub mod state;

pub use drawers::{DrawContext, DrawError, DrawerRegistry, GroupCanvas, SettingDrawer};
pub use filter::{CategorySort, FilterState, FilterToggle};
pub use grouping::{CategoryGroup, ModuleGroup};
pub use input::PanelCommand;
pub use render::render_settings;
pub use state::{PanelError, SettingsPanel, StatusLine};
