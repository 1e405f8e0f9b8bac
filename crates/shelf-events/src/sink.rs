use std::sync::{
    mpsc::{self, Receiver, Sender},
    Mutex, PoisonError,
};

use crate::ShelfEvent;

/// Trait for consuming events.
///
/// Each frontend provides its own implementation.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: ShelfEvent);
}

/// Channel-based event sink.
///
/// Sends events through a standard mpsc channel whose receiver is polled by the
/// frontend.
pub struct ChannelSink {
    sender: Sender<ShelfEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, Receiver<ShelfEvent>) {
        let (sender, receiver) = mpsc::channel();
        (Self { sender }, receiver)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: ShelfEvent) {
        let _ = self.sender.send(event);
    }
}

/// Collector sink that stores all events for inspection.
#[derive(Default)]
pub struct CollectorSink {
    events: Mutex<Vec<ShelfEvent>>,
}

impl CollectorSink {
    pub fn events(&self) -> Vec<ShelfEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for CollectorSink {
    fn emit(&self, event: ShelfEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}
