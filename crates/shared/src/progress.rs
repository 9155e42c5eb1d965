//! Progress events and the fire-and-forget progress bus.

use serde::Serialize;
use tokio::sync::mpsc;

/// A structured progress event published during a migration run.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressEvent {
    /// Human-readable description of the current operation.
    pub message: String,
    /// Overall progress percentage (0-100) when known.
    pub progress: Option<u8>,
    /// Set on the final event of a run.
    pub completed: bool,
}

impl ProgressEvent {
    /// Creates an in-flight progress event.
    #[must_use]
    pub fn update(message: impl Into<String>, progress: u8) -> Self {
        Self {
            message: message.into(),
            progress: Some(progress.min(100)),
            completed: false,
        }
    }

    /// Creates a message-only event (no percentage).
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            progress: None,
            completed: false,
        }
    }

    /// Creates the terminal event of a run.
    #[must_use]
    pub fn completed(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            progress: Some(100),
            completed: true,
        }
    }
}

/// Fire-and-forget publisher for progress events.
///
/// Publishing never blocks and never fails the run; slow or absent
/// subscribers only lose events.
pub trait ProgressBus: Send + Sync {
    /// Publishes an event. Dropped if no subscriber is listening.
    fn publish(&self, event: ProgressEvent);
}

/// Progress bus backed by an unbounded tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelProgressBus {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ChannelProgressBus {
    /// Creates a bus and the receiving half for the subscriber.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ProgressBus for ChannelProgressBus {
    fn publish(&self, event: ProgressEvent) {
        // Receiver may already be gone; losing events is fine.
        let _ = self.tx.send(event);
    }
}

/// Bus that discards every event, for tests and headless runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgressBus;

impl ProgressBus for NullProgressBus {
    fn publish(&self, _event: ProgressEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_caps_percentage() {
        let event = ProgressEvent::update("halfway", 150);
        assert_eq!(event.progress, Some(100));
        assert!(!event.completed);
    }

    #[test]
    fn test_completed_event() {
        let event = ProgressEvent::completed("done");
        assert_eq!(event.progress, Some(100));
        assert!(event.completed);
    }

    #[tokio::test]
    async fn test_channel_bus_delivers() {
        let (bus, mut rx) = ChannelProgressBus::new();
        bus.publish(ProgressEvent::update("fetching", 40));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.message, "fetching");
        assert_eq!(event.progress, Some(40));
    }

    #[test]
    fn test_channel_bus_survives_dropped_receiver() {
        let (bus, rx) = ChannelProgressBus::new();
        drop(rx);
        // Must not panic or error.
        bus.publish(ProgressEvent::message("nobody listening"));
    }
}
