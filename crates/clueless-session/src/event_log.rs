//! The human-readable game feed.

use std::collections::VecDeque;

/// Append-only lines in arrival order, bounded by capacity.
///
/// Once full, each new line evicts the oldest one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLog {
    lines: VecDeque<String>,
    capacity: usize,
}

impl EventLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    /// Appends a line. A zero-capacity log keeps nothing.
    pub fn push(&mut self, line: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        let line = line.into();
        tracing::debug!(%line, "event logged");
        self.lines.push_back(line);
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn latest(&self) -> Option<&str> {
        self.lines.back().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_arrival_order() {
        let mut log = EventLog::with_capacity(3);
        log.push("a");
        log.push("b");
        assert_eq!(log.iter().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(log.latest(), Some("b"));
    }

    #[test]
    fn test_push_when_full_evicts_oldest() {
        let mut log = EventLog::with_capacity(2);
        log.push("a");
        log.push("b");
        log.push("c");
        assert_eq!(log.iter().collect::<Vec<_>>(), ["b", "c"]);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let mut log = EventLog::with_capacity(0);
        log.push("a");
        assert!(log.is_empty());
    }
}
