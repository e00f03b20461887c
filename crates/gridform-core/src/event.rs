//! Session notifications.
//!
//! ## Learning: Broadcast Channels
//!
//! `tokio::sync::broadcast` lets any number of observers (a status bar, an
//! audit log, a test) watch the session without the session holding
//! references to them. Events are values; each subscriber gets a clone.

use tokio::sync::broadcast;

/// Something that happened in an edit session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Editors were planned
    Planned { editors: usize, tabs: usize },
    /// A column's value was written
    ValueChanged { column: String },
    /// Files were selected for a field
    FilesSelected { field: String, count: usize },
    /// A commit was started
    CommitStarted,
    /// The record was saved
    CommitSucceeded,
    /// Saving failed; carries the banner text
    CommitFailed { message: String },
    /// The user asked to leave the form
    BackRequested,
}

/// Event bus for broadcasting session events.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    /// Creates a new event bus.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(64);
        Self { sender }
    }

    /// Emits an event to all subscribers.
    pub fn emit(&self, event: SessionEvent) {
        // No receivers is fine
        let _ = self.sender.send(event);
    }

    /// Subscribes to future events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper for consuming events in a loop.
///
/// ```ignore
/// let mut handler = EventHandler::new(session.subscribe());
/// while let Some(event) = handler.next().await {
///     println!("{event:?}");
/// }
/// ```
pub struct EventHandler {
    receiver: broadcast::Receiver<SessionEvent>,
}

impl EventHandler {
    /// Creates a new event handler.
    pub fn new(receiver: broadcast::Receiver<SessionEvent>) -> Self {
        Self { receiver }
    }

    /// Waits for the next event. Returns `None` once the bus is gone.
    pub async fn next(&mut self) -> Option<SessionEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("Event handler lagged, missed {} events", n);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Returns the next event if one is already queued.
    pub fn try_next(&mut self) -> Option<SessionEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    tracing::warn!("Event handler lagged, missed {} events", n);
                }
                Err(_) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.emit(SessionEvent::CommitStarted);

        assert_eq!(rx.recv().await.unwrap(), SessionEvent::CommitStarted);
    }

    #[tokio::test]
    async fn test_handler_ends_when_bus_dropped() {
        let bus = EventBus::new();
        let mut handler = EventHandler::new(bus.subscribe());

        bus.emit(SessionEvent::BackRequested);
        drop(bus);

        assert_eq!(handler.next().await, Some(SessionEvent::BackRequested));
        assert_eq!(handler.next().await, None);
    }

    #[test]
    fn test_try_next_without_events() {
        let bus = EventBus::new();
        let mut handler = EventHandler::new(bus.subscribe());
        assert_eq!(handler.try_next(), None);
        bus.emit(SessionEvent::CommitSucceeded);
        assert_eq!(handler.try_next(), Some(SessionEvent::CommitSucceeded));
    }
}
