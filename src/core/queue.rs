//! Priority-ordered stage queues.
//!
//! Each pipeline stage keeps admitted jobs in a min-priority binary heap:
//! the lowest priority number is granted first, and jobs with equal priority
//! come out in submission order. Removal by id rebuilds the heap, which is
//! acceptable at the queue depths the coordinator sees.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;

use tokio::sync::oneshot;

use crate::core::error::SchedulerError;
use crate::core::job::{CancelState, JobId, JobRequest};
use crate::core::resource_pool::ResourceKind;

/// An admitted job waiting for, or holding, a resource grant.
///
/// Owns the single-assignment completion sender; whichever component settles
/// the job consumes it.
#[derive(Debug)]
pub struct QueuedJob {
    /// Identifier assigned at submission.
    pub id: JobId,
    /// Submission sequence number, the FIFO tie-break within a priority.
    pub seq: u64,
    /// The resource request and payload.
    pub request: JobRequest,
    /// Completion slot, settled exactly once.
    pub done: oneshot::Sender<Result<String, SchedulerError>>,
    /// Cancellation signal shared with the job's handle.
    pub cancel: Arc<CancelState>,
}

/// Wrapper to order jobs min-priority-first and FIFO within a priority.
///
/// `BinaryHeap` is a max-heap, so both comparisons are reversed.
struct PendingJob {
    job: QueuedJob,
}

impl PartialEq for PendingJob {
    fn eq(&self, other: &Self) -> bool {
        self.job.id == other.job.id
    }
}

impl Eq for PendingJob {}

impl PartialOrd for PendingJob {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PendingJob {
    fn cmp(&self, other: &Self) -> Ordering {
        match other.job.request.priority.cmp(&self.job.request.priority) {
            // Earlier submission wins among equal priorities.
            Ordering::Equal => other.job.seq.cmp(&self.job.seq),
            ordering => ordering,
        }
    }
}

/// Priority queue of jobs waiting for one resource kind.
pub struct StageQueue {
    kind: ResourceKind,
    jobs: BinaryHeap<PendingJob>,
}

impl StageQueue {
    /// Create an empty queue keyed on `kind` for head-cost evaluation.
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            jobs: BinaryHeap::new(),
        }
    }

    /// Resource kind this stage grants.
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Insert a job, O(log n).
    pub fn push(&mut self, job: QueuedJob) {
        self.jobs.push(PendingJob { job });
    }

    /// Cost of the highest-priority waiting job, if any.
    pub fn head_cost(&self) -> Option<u32> {
        self.jobs.peek().map(|pending| match self.kind {
            ResourceKind::Cpu => pending.job.request.cpu_units,
            ResourceKind::GpuMem => pending.job.request.gpu_units,
        })
    }

    /// Remove and return the highest-priority waiting job, O(log n).
    pub fn pop(&mut self) -> Option<QueuedJob> {
        self.jobs.pop().map(|pending| pending.job)
    }

    /// Remove a job by id, rebuilding the heap around it.
    pub fn remove(&mut self, id: JobId) -> Option<QueuedJob> {
        if !self.jobs.iter().any(|pending| pending.job.id == id) {
            return None;
        }
        let mut removed = None;
        let retained: Vec<PendingJob> = self
            .jobs
            .drain()
            .filter_map(|pending| {
                if pending.job.id == id {
                    removed = Some(pending.job);
                    None
                } else {
                    Some(pending)
                }
            })
            .collect();
        self.jobs = retained.into_iter().collect();
        removed
    }

    /// Number of waiting jobs.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_job(id: JobId, seq: u64, priority: i32, cpu: u32, gpu: u32) -> QueuedJob {
        let (done, _rx) = oneshot::channel();
        QueuedJob {
            id,
            seq,
            request: JobRequest::new(priority, format!("job-{id}"))
                .with_cpu_units(cpu)
                .with_gpu_units(gpu),
            done,
            cancel: Arc::new(CancelState::new()),
        }
    }

    #[test]
    fn lower_priority_number_pops_first() {
        let mut q = StageQueue::new(ResourceKind::Cpu);
        q.push(make_job(1, 1, 5, 1, 1));
        q.push(make_job(2, 2, 0, 1, 1));
        q.push(make_job(3, 3, 2, 1, 1));
        q.push(make_job(4, 4, -1, 1, 1));

        assert_eq!(q.pop().unwrap().id, 4);
        assert_eq!(q.pop().unwrap().id, 2);
        assert_eq!(q.pop().unwrap().id, 3);
        assert_eq!(q.pop().unwrap().id, 1);
        assert!(q.pop().is_none());
    }

    #[test]
    fn fifo_within_equal_priority() {
        let mut q = StageQueue::new(ResourceKind::Cpu);
        q.push(make_job(1, 10, 1, 1, 1));
        q.push(make_job(2, 11, 1, 1, 1));
        q.push(make_job(3, 12, 1, 1, 1));

        assert_eq!(q.pop().unwrap().id, 1);
        assert_eq!(q.pop().unwrap().id, 2);
        assert_eq!(q.pop().unwrap().id, 3);
    }

    #[test]
    fn head_cost_follows_stage_kind() {
        let mut cpu_q = StageQueue::new(ResourceKind::Cpu);
        let mut gpu_q = StageQueue::new(ResourceKind::GpuMem);
        cpu_q.push(make_job(1, 1, 0, 3, 7));
        gpu_q.push(make_job(2, 2, 0, 3, 7));

        assert_eq!(cpu_q.head_cost(), Some(3));
        assert_eq!(gpu_q.head_cost(), Some(7));
        assert_eq!(StageQueue::new(ResourceKind::Cpu).head_cost(), None);
    }

    #[test]
    fn remove_by_id_keeps_remaining_order() {
        let mut q = StageQueue::new(ResourceKind::Cpu);
        q.push(make_job(1, 1, 0, 1, 1));
        q.push(make_job(2, 2, 1, 1, 1));
        q.push(make_job(3, 3, 2, 1, 1));

        let removed = q.remove(2).expect("job 2 should be present");
        assert_eq!(removed.id, 2);
        assert_eq!(q.len(), 2);
        assert_eq!(q.pop().unwrap().id, 1);
        assert_eq!(q.pop().unwrap().id, 3);
    }

    #[test]
    fn remove_missing_id_is_none() {
        let mut q = StageQueue::new(ResourceKind::GpuMem);
        q.push(make_job(1, 1, 0, 1, 1));
        assert!(q.remove(99).is_none());
        assert_eq!(q.len(), 1);
    }
}
