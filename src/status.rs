use std::collections::VecDeque;

pub const STATUS_LOG_CAPACITY: usize = 5;

/// Rolling log of the most recent pipeline status lines, kept for diagnostic
/// display. Pushing beyond capacity evicts the oldest entry.
#[derive(Debug, Default)]
pub struct StatusLog {
    entries: VecDeque<String>,
}

impl StatusLog {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(STATUS_LOG_CAPACITY),
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        if self.entries.len() == STATUS_LOG_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(line.into());
    }

    /// Entries in arrival order, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
