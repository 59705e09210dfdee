use std::sync::atomic::{AtomicUsize, Ordering};

/// Completed-query counters for progress logging
///
/// Kept outside the aggregator lock; nothing here affects the harvest itself.
#[derive(Debug)]
pub struct Progress {
    total: usize,
    completed: AtomicUsize,
    failed: AtomicUsize,
}

impl Progress {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            completed: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
        }
    }

    /// Marks one query finished, returning how many are now done
    pub fn finish(&self, failed: bool) -> usize {
        if failed {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
        self.completed.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::Relaxed)
    }
}
