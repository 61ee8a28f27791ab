// Settings panel library - exposes all core modules for testing

pub mod config;
#[cfg(feature = "runtime")]
pub mod config_io;
pub mod model;
pub mod services;
pub mod view;
