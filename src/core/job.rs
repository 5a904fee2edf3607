//! Job requests, identifiers, cancellation state, and completion records.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Notify;

/// Unique job identifier, assigned at submission.
pub type JobId = u64;

/// Resource and priority description for one unit of work.
///
/// `priority` is min-first: a job with priority 0 is granted ahead of a job
/// with priority 5. Among equal priorities, jobs are granted in submission
/// order (FIFO). Resource amounts are unsigned, so negative requests are
/// unrepresentable by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRequest {
    /// Scheduling priority; lower number schedules first.
    pub priority: i32,
    /// Opaque work product, echoed back on completion.
    pub payload: String,
    /// CPU thread capacity held during the CPU phase.
    pub cpu_units: u32,
    /// GPU memory capacity held during the GPU phase.
    pub gpu_units: u32,
    /// Simulated GPU phase duration, used by the default executor.
    #[serde(default)]
    pub duration_hint: Option<Duration>,
}

impl JobRequest {
    /// Create a request with the given priority and payload and zero
    /// resource cost.
    pub fn new(priority: i32, payload: impl Into<String>) -> Self {
        Self {
            priority,
            payload: payload.into(),
            cpu_units: 0,
            gpu_units: 0,
            duration_hint: None,
        }
    }

    /// Set the CPU thread units held during preprocessing.
    #[must_use]
    pub fn with_cpu_units(mut self, units: u32) -> Self {
        self.cpu_units = units;
        self
    }

    /// Set the GPU memory units held during inference.
    #[must_use]
    pub fn with_gpu_units(mut self, units: u32) -> Self {
        self.gpu_units = units;
        self
    }

    /// Set the simulated GPU phase duration.
    #[must_use]
    pub fn with_duration_hint(mut self, hint: Duration) -> Self {
        self.duration_hint = Some(hint);
        self
    }
}

/// Record of a job that finished its GPU phase, in completion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedJob {
    /// Identifier assigned at submission.
    pub id: JobId,
    /// Priority the job was scheduled with.
    pub priority: i32,
    /// Payload echoed back to the caller.
    pub payload: String,
}

/// One-shot cancellation signal shared between a job's handle and its
/// in-flight phase task.
///
/// `trigger` is idempotent. The notify carries a stored permit, so a phase
/// task that starts selecting after the trigger still observes it.
#[derive(Debug)]
pub struct CancelState {
    flag: AtomicBool,
    notify: Notify,
}

impl Default for CancelState {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelState {
    /// Create an untriggered cancellation state.
    pub fn new() -> Self {
        Self {
            flag: AtomicBool::new(false),
            notify: Notify::new(),
        }
    }

    /// Mark the job cancelled and wake any phase task waiting on it.
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::Release);
        self.notify.notify_one();
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Resolve once cancellation is requested. Resolves immediately if the
    /// trigger already fired.
    pub async fn cancelled(&self) {
        if self.is_cancelled() {
            return;
        }
        // notify_one stores a permit when no waiter is registered, so a
        // trigger racing this call cannot be lost.
        self.notify.notified().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn request_builder_defaults_to_zero_cost() {
        let req = JobRequest::new(3, "prompt");
        assert_eq!(req.priority, 3);
        assert_eq!(req.cpu_units, 0);
        assert_eq!(req.gpu_units, 0);
        assert!(req.duration_hint.is_none());
    }

    #[test]
    fn request_builder_sets_costs() {
        let req = JobRequest::new(0, "p")
            .with_cpu_units(2)
            .with_gpu_units(512)
            .with_duration_hint(Duration::from_millis(5));
        assert_eq!(req.cpu_units, 2);
        assert_eq!(req.gpu_units, 512);
        assert_eq!(req.duration_hint, Some(Duration::from_millis(5)));
    }

    #[tokio::test]
    async fn cancel_before_wait_resolves_immediately() {
        let state = CancelState::new();
        state.trigger();
        assert!(state.is_cancelled());
        state.cancelled().await;
    }

    #[tokio::test]
    async fn cancel_wakes_waiter() {
        let state = Arc::new(CancelState::new());
        let waiter = {
            let state = Arc::clone(&state);
            tokio::spawn(async move { state.cancelled().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        state.trigger();
        waiter.await.expect("waiter should resolve after trigger");
    }
}
