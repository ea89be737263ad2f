//! Bounded in-memory window of live events

use std::collections::VecDeque;

use crate::audit::AuditEvent;
use crate::config::MAX_LIVE_WINDOW;

/// Keeps the newest events seen live; the oldest fall off first.
#[derive(Debug, Clone)]
pub struct LiveWindow {
    events: VecDeque<AuditEvent>,
    capacity: usize,
}

impl LiveWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, MAX_LIVE_WINDOW);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, event: AuditEvent) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    /// Up to `n` newest events, oldest first.
    pub fn latest(&self, n: usize) -> Vec<AuditEvent> {
        let skip = self.events.len().saturating_sub(n);
        self.events.iter().skip(skip).cloned().collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
