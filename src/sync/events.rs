//! Consumer-facing jar events.
//!
//! A typed publish/subscribe surface over a broadcast channel: consumers
//! subscribe for a receiver and unsubscribe by dropping it, so listeners
//! cannot leak across context transitions.

use crate::cookies::identity::CookieId;
use crate::cookies::record::CookieRecord;
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 64;

/// What happened to a single jar entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Updated,
    Removed,
}

/// A single-entry change, carrying enough for a consumer to patch a
/// rendered view without a full redraw.
#[derive(Debug, Clone, PartialEq)]
pub struct JarDelta {
    pub kind: ChangeKind,
    pub id: CookieId,
    /// The record that was added or updated, or the record as it was when
    /// removed.
    pub record: CookieRecord,
}

/// Events emitted by the reconciliation engine.
#[derive(Debug, Clone, PartialEq)]
pub enum JarEvent {
    /// The jar is usable for the first time. Emitted at most once per
    /// engine construction.
    Ready,
    /// Jar content changed. `None` means "treat as a full refresh";
    /// `Some` carries the single-entry delta.
    Changed(Option<JarDelta>),
}

/// Broadcast-backed event bus for [`JarEvent`]s.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<JarEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(EVENT_CAPACITY)
    }
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JarEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn emit(&self, event: JarEvent) {
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribe_receives_events() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.emit(JarEvent::Ready);
        assert_eq!(rx.recv().await.unwrap(), JarEvent::Ready);
    }

    #[test]
    fn test_emit_without_subscribers_is_fine() {
        let bus = EventBus::default();
        bus.emit(JarEvent::Changed(None));
    }

    #[tokio::test]
    async fn test_drop_unsubscribes() {
        let bus = EventBus::default();
        let rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        drop(rx);
        assert_eq!(bus.subscriber_count(), 0);
    }
}
