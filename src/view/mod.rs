//! View and UI layer
//!
//! The settings pipeline (filter, grouping, collapse state, panel state) and
//! its terminal presentation.

pub mod settings;
pub mod theme;
pub mod ui;
