//! Completion log: an ordered, shared record of finished jobs.

use parking_lot::Mutex;

use crate::core::job::CompletedJob;

/// Append-only list of completed jobs, in completion order.
///
/// Appended by the coordinator when a GPU phase finishes; read concurrently
/// by observers. Cancelled jobs never appear here.
#[derive(Debug, Default)]
pub struct CompletionLog {
    entries: Mutex<Vec<CompletedJob>>,
}

impl CompletionLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a completion record.
    pub fn record(&self, entry: CompletedJob) {
        self.entries.lock().push(entry);
    }

    /// Point-in-time copy of the log, in completion order.
    pub fn snapshot(&self) -> Vec<CompletedJob> {
        self.entries.lock().clone()
    }

    /// Number of completed jobs.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether any job has completed.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
