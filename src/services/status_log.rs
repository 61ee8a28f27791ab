//! Status message layer for tracing
//!
//! Forwards INFO+ events logged on [`STATUS_TARGET`] to a channel. The host
//! drains the channel each frame and shows the latest message in the panel's
//! status line ("Imported 3 settings from ...", "Failed to export: ...").

use super::STATUS_TARGET;
use std::fmt;
use std::sync::mpsc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

/// A user-facing message captured from the log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub level: Level,
    pub text: String,
}

impl StatusMessage {
    pub fn is_error(&self) -> bool {
        self.level <= Level::WARN
    }
}

/// Receiving side held by the host
pub struct StatusLogHandle {
    pub receiver: mpsc::Receiver<StatusMessage>,
}

impl StatusLogHandle {
    /// Most recent pending message, discarding older ones
    pub fn latest(&self) -> Option<StatusMessage> {
        self.receiver.try_iter().last()
    }
}

pub struct StatusLogLayer {
    sender: mpsc::Sender<StatusMessage>,
}

/// Create the layer and the handle receiving its messages
pub fn create() -> (StatusLogLayer, StatusLogHandle) {
    let (sender, receiver) = mpsc::channel();
    (StatusLogLayer { sender }, StatusLogHandle { receiver })
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }
}

impl<S: Subscriber> Layer<S> for StatusLogLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if metadata.target() != STATUS_TARGET || *metadata.level() > Level::INFO {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        // Receiver gone means the host shut down; nothing to report to
        let _ = self.sender.send(StatusMessage {
            level: *metadata.level(),
            text: visitor.message,
        });
    }
}
