//! Store events
//!
//! Point notifications scoped to one store instance. Each subscriber gets
//! its own channel; subscribers whose receiver is gone are pruned on the
//! next emit.

use crossbeam::channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;

/// Notifications a store emits over its lifetime
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// Replay finished and the store accepts operations
    Opened,

    /// The store was closed; further operations fail with `NotOpen`
    Closed,

    /// Every issued write (and flush) has completed
    Drained,

    /// An open, write, flush or close failed
    Error(String),
}

/// Fan-out of events to per-instance subscribers
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Mutex<Vec<Sender<StoreEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber
    pub fn subscribe(&self) -> Receiver<StoreEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    pub fn emit(&self, event: StoreEvent) {
        self.subscribers
            .lock()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_reaches_every_subscriber() {
        let bus = EventBus::new();
        let a = bus.subscribe();
        let b = bus.subscribe();

        bus.emit(StoreEvent::Drained);

        assert_eq!(a.try_recv(), Ok(StoreEvent::Drained));
        assert_eq!(b.try_recv(), Ok(StoreEvent::Drained));
    }

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let bus = EventBus::new();
        let kept = bus.subscribe();
        let dropped = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        drop(dropped);
        bus.emit(StoreEvent::Closed);

        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(kept.try_recv(), Ok(StoreEvent::Closed));
    }
}
