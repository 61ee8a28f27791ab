//! Tracing subscriber setup
//!
//! Shared tracing configuration used by the host binary and by tests.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use super::status_log::{StatusLogHandle, StatusLogLayer};

/// Initialize the global tracing subscriber with file logging and status
/// message capture.
///
/// - File-based logging to `log_file_path` (the terminal belongs to the panel)
/// - Environment-based filtering (RUST_LOG) with DEBUG default
/// - Status layer forwarding user-facing messages to the returned handle
///
/// Returns `None` if the log file cannot be created.
pub fn init_global(log_file_path: &Path) -> Option<StatusLogHandle> {
    let (status_layer, status_handle) = super::status_log::create();
    let log_file = File::create(log_file_path).ok()?;

    let subscriber = build_subscriber(log_file, Some(status_layer));
    subscriber.init();

    Some(status_handle)
}

/// Build a subscriber with file logging and an optional status layer.
pub fn build_subscriber(
    log_file: File,
    status_layer: Option<StatusLogLayer>,
) -> impl tracing::Subscriber + Send + Sync {
    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into());

    let fmt_layer = fmt::layer().with_ansi(false).with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .with(status_layer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::STATUS_TARGET;
    use tempfile::NamedTempFile;

    #[test]
    fn test_file_receives_debug_and_status_reaches_handle() {
        let log_file = NamedTempFile::new().unwrap();
        let (status_layer, status_handle) = crate::services::status_log::create();
        let subscriber = build_subscriber(log_file.reopen().unwrap(), Some(status_layer));

        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!("rebuilt 12 groups");
            tracing::info!(target: STATUS_TARGET, "Exported 4 settings");
        });

        let contents = std::fs::read_to_string(log_file.path()).unwrap();
        assert!(contents.contains("rebuilt 12 groups"));
        assert!(contents.contains("Exported 4 settings"));

        let status = status_handle.latest().unwrap();
        assert_eq!(status.text, "Exported 4 settings");
    }
}
