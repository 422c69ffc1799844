//! Event queue
//!
//! In-memory FIFO of [`Event`]s. The queue is owned by whoever constructs it
//! and handed to producers and consumers explicitly; nothing is persisted, so
//! pending events are lost when the process exits.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::domain::event::Event;

/// Thread-safe FIFO event queue
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Mutex<VecDeque<Event>>,
}

impl EventQueue {
    /// Creates an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event to the back of the queue
    pub fn push_event(&self, event: Event) {
        self.lock().push_back(event);
    }

    /// Removes the event at the front of the queue
    ///
    /// Returns `None` when the queue is empty.
    pub fn pull_event(&self) -> Option<Event> {
        self.lock().pop_front()
    }

    /// Number of queued events
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Event>> {
        // A panic while holding the lock cannot leave the deque half-modified
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }
}
