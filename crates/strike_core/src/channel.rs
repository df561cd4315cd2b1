//! Single-type event channel
//!
//! Producers push events during a tick, the owner drains them at a fixed
//! point of its update. Sending only needs `&self`, so one channel can be
//! shared by every producer that holds a reference to it.

use parking_lot::Mutex;
use std::collections::VecDeque;

/// Channel for single-type events
pub struct EventChannel<E> {
    queue: Mutex<VecDeque<E>>,
}

impl<E> EventChannel<E> {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
        }
    }

    /// Send an event
    pub fn send(&self, event: E) {
        self.queue.lock().push_back(event);
    }

    /// Receive the oldest pending event
    pub fn receive(&self) -> Option<E> {
        self.queue.lock().pop_front()
    }

    /// Drain all events in send order
    pub fn drain(&self) -> Vec<E> {
        self.queue.lock().drain(..).collect()
    }

    /// Clear all events without processing
    pub fn clear(&self) {
        self.queue.lock().clear();
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Get pending count
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }
}

impl<E> Default for EventChannel<E> {
    fn default() -> Self {
        Self::new()
    }
}
