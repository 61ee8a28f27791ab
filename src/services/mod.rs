//! Services: value conversion, export/import and logging setup

pub mod convert;
#[cfg(feature = "runtime")]
pub mod status_log;
#[cfg(feature = "runtime")]
pub mod tracing_setup;
pub mod transfer;

/// Tracing target for messages meant for the user (import/export outcomes).
///
/// The host routes events on this target to its status line.
pub const STATUS_TARGET: &str = "modconfig::status";
