//! Status event delivery.
//!
//! The engine publishes [`StatusEvent`]s from the event tap thread.  Publishing
//! must not block, so events go onto an unbounded tokio channel and a task on
//! the runtime turns them into log records.

use std::sync::Mutex;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

use crate::application::dispatch_action::{StatusEvent, StatusSink};

/// [`StatusSink`] that forwards events onto a channel.
#[derive(Debug, Clone)]
pub struct ChannelStatusSink {
    tx: UnboundedSender<StatusEvent>,
}

impl StatusSink for ChannelStatusSink {
    fn publish(&self, event: StatusEvent) {
        if self.tx.send(event).is_err() {
            debug!("status receiver gone; dropping event");
        }
    }
}

/// Creates a connected sink and receiver.
pub fn status_channel() -> (ChannelStatusSink, UnboundedReceiver<StatusEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelStatusSink { tx }, rx)
}

/// Logs every status event until all senders are dropped.
///
/// Returns the number of events seen.
pub async fn log_status_events(mut rx: UnboundedReceiver<StatusEvent>) -> usize {
    let mut seen = 0;
    while let Some(event) = rx.recv().await {
        seen += 1;
        match event {
            StatusEvent::Armed => info!(status = "armed", "KeyMouse armed"),
            StatusEvent::Disarmed => info!(status = "disarmed", "KeyMouse disarmed"),
            StatusEvent::ActionTaken { name } => info!(status = "action", app = %name, "opened {name}"),
        }
    }
    seen
}

/// A [`StatusSink`] that records events for assertions.
#[derive(Debug, Default)]
pub struct RecordingStatusSink {
    events: Mutex<Vec<StatusEvent>>,
}

impl RecordingStatusSink {
    /// Snapshot of all published events, oldest first.
    pub fn events(&self) -> Vec<StatusEvent> {
        self.events.lock().expect("lock poisoned").clone()
    }
}

impl StatusSink for RecordingStatusSink {
    fn publish(&self, event: StatusEvent) {
        self.events.lock().expect("lock poisoned").push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_sink_delivers_in_order() {
        // Arrange
        let (sink, mut rx) = status_channel();

        // Act
        sink.publish(StatusEvent::Armed);
        sink.publish(StatusEvent::ActionTaken {
            name: "Safari".to_string(),
        });
        sink.publish(StatusEvent::Disarmed);

        // Assert
        assert_eq!(rx.recv().await, Some(StatusEvent::Armed));
        assert_eq!(
            rx.recv().await,
            Some(StatusEvent::ActionTaken {
                name: "Safari".to_string()
            })
        );
        assert_eq!(rx.recv().await, Some(StatusEvent::Disarmed));
    }

    #[test]
    fn test_logger_drains_until_senders_dropped() {
        let (sink, rx) = status_channel();
        sink.publish(StatusEvent::Armed);
        sink.publish(StatusEvent::Disarmed);
        drop(sink);

        assert_eq!(tokio_test::block_on(log_status_events(rx)), 2);
    }

    #[test]
    fn test_logger_waits_while_a_sender_is_alive() {
        // Arrange
        let (sink, rx) = status_channel();
        sink.publish(StatusEvent::Armed);
        let mut logger = tokio_test::task::spawn(log_status_events(rx));

        // Act / Assert: drained but still pending
        tokio_test::assert_pending!(logger.poll());

        drop(sink);
        assert_eq!(tokio_test::assert_ready!(logger.poll()), 1);
    }

    #[test]
    fn test_publish_after_receiver_dropped_does_not_panic() {
        let (sink, rx) = status_channel();
        drop(rx);
        sink.publish(StatusEvent::Armed);
    }
}
