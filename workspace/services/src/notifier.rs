//! One-way sink for import progress and log lines.
//!
//! Importers call the sink synchronously and never look at the outcome.
//! The HTTP server fans events out through a broadcast channel, the CLI
//! writes them to the log.

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{info, trace};

/// Default capacity for the broadcast channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// Receiver side of the import sink.
pub trait ImportNotifier: Send + Sync {
    /// Human readable line describing what happened to a row.
    fn send_log(&self, message: &str);

    /// Run completion percentage, 0..=100.
    fn send_progress(&self, percent: u8);
}

/// Event pushed to import listeners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum ImportEvent {
    #[serde(rename = "import-log")]
    Log(String),
    #[serde(rename = "import-progress")]
    Progress(u8),
}

/// Fans import events out to every subscriber.
#[derive(Clone, Debug)]
pub struct ImportBroadcaster {
    sender: broadcast::Sender<ImportEvent>,
}

impl ImportBroadcaster {
    /// Create a new ImportBroadcaster with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new ImportBroadcaster with a specific capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to receive events.
    /// Returns a receiver that will receive all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<ImportEvent> {
        self.sender.subscribe()
    }

    /// Broadcast an event, returning how many receivers got it.
    /// No subscribers is not an error, the event is dropped.
    pub fn send(&self, event: ImportEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}

impl Default for ImportBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportNotifier for ImportBroadcaster {
    fn send_log(&self, message: &str) {
        let delivered = self.send(ImportEvent::Log(message.to_string()));
        trace!(delivered, "import-log: {}", message);
    }

    fn send_progress(&self, percent: u8) {
        let delivered = self.send(ImportEvent::Progress(percent));
        trace!(delivered, "import-progress: {}%", percent);
    }
}

/// Writes import events to the application log. Used by the CLI import.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl ImportNotifier for TracingNotifier {
    fn send_log(&self, message: &str) {
        info!("{}", message);
    }

    fn send_progress(&self, percent: u8) {
        info!("Import progress: {}%", percent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_broadcast_to_multiple_receivers() {
        let broadcaster = ImportBroadcaster::new();

        let mut rx1 = broadcaster.subscribe();
        let mut rx2 = broadcaster.subscribe();

        broadcaster.send_progress(42);

        assert_eq!(rx1.recv().await.unwrap(), ImportEvent::Progress(42));
        assert_eq!(rx2.recv().await.unwrap(), ImportEvent::Progress(42));
    }

    #[test]
    fn test_no_subscribers_no_error() {
        let broadcaster = ImportBroadcaster::new();

        // Should not panic or error, just return 0
        assert_eq!(broadcaster.send(ImportEvent::Log("row".to_string())), 0);
        broadcaster.send_log("still fine");
    }

    #[test]
    fn test_event_wire_names() {
        let json = serde_json::to_value(ImportEvent::Progress(10)).unwrap();
        assert_eq!(json["event"], "import-progress");
        assert_eq!(json["data"], 10);

        let json = serde_json::to_value(ImportEvent::Log("hello".to_string())).unwrap();
        assert_eq!(json["event"], "import-log");
        assert_eq!(json["data"], "hello");
    }
}
