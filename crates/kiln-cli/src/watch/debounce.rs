//! Event coalescing for the rebuild loop.
//!
//! A burst of change events within the debounce window collapses into one
//! deadline; every new event pushes the deadline out. Time is passed in
//! rather than read, so tests drive the debouncer with synthetic instants.

use std::time::{Duration, Instant};

/// Sliding-window debouncer.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    /// Create a debouncer with the given quiet window.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// Record a change event at `now`, pushing the deadline out.
    pub fn record(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    /// The instant the pending window elapses, if one is pending.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether any events are waiting to be flushed.
    pub fn pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Flush if the window has elapsed at `now`. Returns whether the caller
    /// should act; the pending state is cleared on flush.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
