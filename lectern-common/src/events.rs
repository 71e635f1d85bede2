//! Event types and broadcast bus
//!
//! Processing progress is broadcast as `LecternEvent` values over a
//! tokio broadcast channel. Subscribers (the SSE endpoint) receive events
//! emitted after they subscribe; emission never blocks the pipeline.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Events emitted while a session's files move through the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LecternEvent {
    /// A file transitioned pending → processing
    FileProcessingStarted {
        session_id: Uuid,
        file_id: Uuid,
        filename: String,
    },
    /// Extraction succeeded; text stored
    FileProcessingCompleted {
        session_id: Uuid,
        file_id: Uuid,
        filename: String,
        text_chars: usize,
    },
    /// Extraction failed; error detail stored
    FileProcessingFailed {
        session_id: Uuid,
        file_id: Uuid,
        filename: String,
        error: String,
    },
    /// Every file in the batch reached a terminal state
    SessionProcessingFinished {
        session_id: Uuid,
        completed: usize,
        failed: usize,
    },
}

impl LecternEvent {
    /// Event type name for SSE event framing
    pub fn event_type(&self) -> &'static str {
        match self {
            LecternEvent::FileProcessingStarted { .. } => "file_processing_started",
            LecternEvent::FileProcessingCompleted { .. } => "file_processing_completed",
            LecternEvent::FileProcessingFailed { .. } => "file_processing_failed",
            LecternEvent::SessionProcessingFinished { .. } => "session_processing_finished",
        }
    }
}

/// Broadcast bus for processing events
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<LecternEvent>,
}

impl EventBus {
    /// Create a new bus with the given channel capacity
    ///
    /// Older events are dropped for lagging subscribers once the buffer
    /// fills; the pipeline never waits on slow consumers.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<LecternEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns the subscriber count; zero subscribers is not an error.
    pub fn emit(&self, event: LecternEvent) -> usize {
        match self.tx.send(event) {
            Ok(count) => count,
            Err(_) => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_emitted_event() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        let session_id = Uuid::new_v4();
        bus.emit(LecternEvent::SessionProcessingFinished {
            session_id,
            completed: 2,
            failed: 1,
        });

        match rx.recv().await.unwrap() {
            LecternEvent::SessionProcessingFinished {
                session_id: got,
                completed,
                failed,
            } => {
                assert_eq!(got, session_id);
                assert_eq!(completed, 2);
                assert_eq!(failed, 1);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn emit_without_subscribers_is_ok() {
        let bus = EventBus::new(4);
        let count = bus.emit(LecternEvent::FileProcessingStarted {
            session_id: Uuid::new_v4(),
            file_id: Uuid::new_v4(),
            filename: "notes.pdf".into(),
        });
        assert_eq!(count, 0);
    }
}
