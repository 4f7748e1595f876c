use std::collections::VecDeque;

use super::types::MatchEvent;

pub const DEFAULT_LOG_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub struct LoggedEvent {
    pub sequence: u32,
    pub at_ms: i64,
    pub event: MatchEvent,
}

// Append-only, newest last. Once full, the oldest entry is evicted.
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<LoggedEvent>,
    next_sequence: u32,
    capacity: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            next_sequence: 0,
            capacity,
        }
    }

    pub fn push(&mut self, at_ms: i64, event: MatchEvent) -> u32 {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.wrapping_add(1);

        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(LoggedEvent {
            sequence,
            at_ms,
            event,
        });
        sequence
    }

    pub fn iter(&self) -> impl Iterator<Item = &LoggedEvent> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&LoggedEvent> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
