//! Event bus: buffered per cycle, fanned out to subscribers on flush.

use crossbeam_channel::{Receiver, Sender};
use influx_core::Event;
use tracing::trace;

/// Collects events during a cycle and hands them out once it ends.
///
/// The kernel owns the bus. Subscribers receive every flushed event over an
/// unbounded channel; a subscriber that drops its receiver is forgotten on
/// the next flush. No subscriber is required.
#[derive(Debug, Default)]
pub struct EventBus {
    pending: Vec<Event>,
    subscribers: Vec<Sender<Event>>,
    published: u64,
}

impl EventBus {
    /// An empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer an event until the next flush.
    pub fn publish(&mut self, event: Event) {
        self.pending.push(event);
    }

    /// A receiver for every event flushed from now on.
    pub fn subscribe(&mut self) -> Receiver<Event> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Events buffered since the last flush.
    pub fn pending(&self) -> &[Event] {
        &self.pending
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Total events flushed over the bus's lifetime.
    pub fn published(&self) -> u64 {
        self.published
    }

    /// Send buffered events to subscribers and return them.
    pub fn flush(&mut self) -> Vec<Event> {
        let events = std::mem::take(&mut self.pending);
        self.subscribers
            .retain(|tx| events.iter().all(|e| tx.send(e.clone()).is_ok()));
        self.published += events.len() as u64;
        trace!(
            events = events.len(),
            subscribers = self.subscribers.len(),
            "event bus flushed"
        );
        events
    }
}
