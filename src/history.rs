// src/history.rs

//! Append-only record of data exchanged with a supervised process.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};

/// Direction of a history entry relative to the supervised process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Written to the process's stdin.
    In,
    /// Read from the process's stdout.
    Out,
    /// Read from the process's stderr.
    Err,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::In => "IN",
            Direction::Out => "OUT",
            Direction::Err => "ERR",
        };
        write!(f, "{s}")
    }
}

/// One timestamped, directionally-tagged chunk of process IO.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub data: String,
    pub at: DateTime<Utc>,
    pub direction: Direction,
}

/// Ordered, append-only log of [`HistoryEntry`]s.
///
/// Entries are never mutated or removed once appended, with one exception:
/// when a `max_entries` cap is configured, the *oldest* entries are discarded
/// on overflow so that memory stays bounded for long-lived processes. The
/// default is unbounded.
#[derive(Debug, Clone, Default)]
pub struct HistoryLog {
    entries: VecDeque<HistoryEntry>,
    max_entries: Option<usize>,
}

impl HistoryLog {
    pub fn new(max_entries: Option<usize>) -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries,
        }
    }

    /// Append a chunk, stamping it with the current time.
    pub fn append(&mut self, direction: Direction, data: String) {
        self.append_at(direction, data, Utc::now());
    }

    /// Append a chunk with an explicit timestamp (used by tests).
    pub fn append_at(&mut self, direction: Direction, data: String, at: DateTime<Utc>) {
        if let Some(cap) = self.max_entries {
            while self.entries.len() >= cap.max(1) {
                self.entries.pop_front();
            }
        }
        self.entries.push_back(HistoryEntry {
            data,
            at,
            direction,
        });
    }

    /// Read-only snapshot of the log, in insertion order.
    pub fn snapshot(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
