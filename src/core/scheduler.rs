//! Scheduler driver: event-driven coordinator for the two-phase pipeline.
//!
//! All shared mutable state (the two stage queues, the running sets, and the
//! grant decisions against the pool counters) is owned by a single
//! coordinator task. Submissions, phase completions, and cancellations reach
//! it as events on an unbounded channel, and the coordinator re-evaluates
//! grant eligibility after each one. There is no polling: progress is
//! attempted exactly when a resource is released or a job becomes eligible.
//!
//! Phase *execution* is not serialized. Each grant spawns an independent
//! task, so any number of CPU phases and GPU phases run concurrently within
//! the pool totals; only the bookkeeping goes through the coordinator.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use crate::core::admission::admit;
use crate::core::error::SchedulerError;
use crate::core::executor::{PhaseExecutor, SimulatedExecutor};
use crate::core::job::{CancelState, CompletedJob, JobId, JobRequest};
use crate::core::log::CompletionLog;
use crate::core::queue::{QueuedJob, StageQueue};
use crate::core::resource_pool::{ResourceKind, ResourcePool};
use crate::runtime::{Spawn, TokioSpawner};

/// Events delivered to the coordinator. Every queue and counter mutation
/// flows through one of these.
enum Event {
    /// A job passed admission and wants to enter the CPU queue.
    Submit(QueuedJob),
    /// A CPU phase task finished (or observed cancellation).
    CpuDone(JobId),
    /// A GPU phase task finished (or observed cancellation).
    GpuDone(JobId),
    /// A caller asked to cancel a job that may still be queued.
    Cancel(JobId),
    /// The scheduler handle was dropped; drain and exit.
    Shutdown,
}

/// Cancellation handle for a submitted job.
///
/// Cheap to clone and safe to trigger from any task. Cancelling a job that
/// already completed is a no-op.
#[derive(Clone, Debug)]
pub struct Canceller {
    id: JobId,
    cancel: Arc<CancelState>,
    events: mpsc::UnboundedSender<Event>,
}

impl Canceller {
    /// Identifier of the job this cancels.
    pub const fn id(&self) -> JobId {
        self.id
    }

    /// Request cancellation. Idempotent.
    ///
    /// A job still waiting in a queue is removed with no resources touched;
    /// a job mid-phase has its phase interrupted and its held units released
    /// before the cancellation is observable through the handle.
    pub fn cancel(&self) {
        self.cancel.trigger();
        // The coordinator removes queued jobs; running jobs observe the
        // trigger directly. Send failure means the coordinator already
        // drained, in which case the job was settled.
        let _ = self.events.send(Event::Cancel(self.id));
    }
}

/// Pending result of a submitted job.
#[derive(Debug)]
pub struct JobHandle {
    canceller: Canceller,
    done: oneshot::Receiver<Result<String, SchedulerError>>,
}

impl JobHandle {
    /// Identifier assigned to the job at submission.
    pub const fn id(&self) -> JobId {
        self.canceller.id()
    }

    /// Obtain a cancellation handle usable while (or after) waiting.
    pub fn canceller(&self) -> Canceller {
        self.canceller.clone()
    }

    /// Request cancellation without consuming the handle.
    pub fn cancel(&self) {
        self.canceller.cancel();
    }

    /// Suspend until the job is settled.
    ///
    /// # Errors
    ///
    /// `Cancelled` if the job was cancelled before completion, `Shutdown` if
    /// the scheduler was torn down before settling the job.
    pub async fn wait(self) -> Result<String, SchedulerError> {
        match self.done.await {
            Ok(result) => result,
            Err(_) => Err(SchedulerError::Shutdown),
        }
    }
}

/// Two-phase, dual-resource job scheduler.
///
/// Construction spawns the coordinator task; dropping the scheduler lets the
/// coordinator drain in-flight jobs and exit. Submission is admission-checked
/// synchronously and resolved asynchronously through the returned handle.
#[derive(Debug)]
pub struct Scheduler {
    events: mpsc::UnboundedSender<Event>,
    pool: Arc<ResourcePool>,
    log: Arc<CompletionLog>,
    max_gpu_concurrency: Arc<AtomicU32>,
    next_id: AtomicU64,
}

impl Scheduler {
    /// Create a scheduler with the given pool totals, executor, and spawner.
    pub fn new<E, S>(cpu_total: u32, gpu_total: u32, executor: E, spawner: S) -> Self
    where
        E: PhaseExecutor,
        S: Spawn + Clone + Send + 'static,
    {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let pool = Arc::new(ResourcePool::new(cpu_total, gpu_total));
        let log = Arc::new(CompletionLog::new());
        let max_gpu_concurrency = Arc::new(AtomicU32::new(0));

        let coordinator = Coordinator {
            events: events_rx,
            events_tx: events_tx.clone(),
            pool: Arc::clone(&pool),
            cpu_queue: StageQueue::new(ResourceKind::Cpu),
            gpu_queue: StageQueue::new(ResourceKind::GpuMem),
            running_cpu: HashMap::new(),
            running_gpu: HashMap::new(),
            log: Arc::clone(&log),
            max_gpu_concurrency: Arc::clone(&max_gpu_concurrency),
            next_seq: 0,
            draining: false,
            executor,
            spawner: spawner.clone(),
        };
        spawner.spawn(coordinator.run());

        tracing::info!(cpu_total, gpu_total, "scheduler started");
        Self {
            events: events_tx,
            pool,
            log,
            max_gpu_concurrency,
            next_id: AtomicU64::new(1),
        }
    }

    /// Create a scheduler with the simulated executor on the current tokio
    /// runtime. Must be called within a runtime context.
    pub fn with_defaults(cpu_total: u32, gpu_total: u32) -> Self {
        Self::new(cpu_total, gpu_total, SimulatedExecutor, TokioSpawner::current())
    }

    /// Submit a job for two-phase execution.
    ///
    /// Admission runs synchronously: a rejected request never enters a queue
    /// and no counter moves. An admitted job waits for CPU capacity, runs
    /// its CPU phase, waits for GPU capacity, runs its GPU phase, and then
    /// settles the returned handle with its payload.
    ///
    /// # Errors
    ///
    /// `InvalidRequest` or `Unsatisfiable` on admission failure, `Shutdown`
    /// if the coordinator already exited.
    pub fn submit(&self, request: JobRequest) -> Result<JobHandle, SchedulerError> {
        admit(&request, &self.pool)?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (done_tx, done_rx) = oneshot::channel();
        let cancel = Arc::new(CancelState::new());
        let job = QueuedJob {
            id,
            seq: 0, // assigned by the coordinator in arrival order
            request,
            done: done_tx,
            cancel: Arc::clone(&cancel),
        };

        tracing::debug!(
            job = id,
            priority = job.request.priority,
            cpu_units = job.request.cpu_units,
            gpu_units = job.request.gpu_units,
            "job admitted"
        );
        self.events
            .send(Event::Submit(job))
            .map_err(|_| SchedulerError::Shutdown)?;

        Ok(JobHandle {
            canceller: Canceller {
                id,
                cancel,
                events: self.events.clone(),
            },
            done: done_rx,
        })
    }

    /// Free CPU thread units at this instant.
    pub fn cpu_free(&self) -> u32 {
        self.pool.cpu_free()
    }

    /// Free GPU memory units at this instant.
    pub fn gpu_free(&self) -> u32 {
        self.pool.gpu_free()
    }

    /// Configured CPU thread total.
    pub fn cpu_total(&self) -> u32 {
        self.pool.cpu_total()
    }

    /// Configured GPU memory total.
    pub fn gpu_total(&self) -> u32 {
        self.pool.gpu_total()
    }

    /// Largest number of jobs ever running their GPU phase at once.
    pub fn max_gpu_concurrency(&self) -> u32 {
        self.max_gpu_concurrency.load(Ordering::Acquire)
    }

    /// Snapshot of completed jobs in completion order.
    pub fn completed_jobs(&self) -> Vec<CompletedJob> {
        self.log.snapshot()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        let _ = self.events.send(Event::Shutdown);
    }
}

/// Owner of all scheduling state; runs until shutdown and drain.
struct Coordinator<E, S> {
    events: mpsc::UnboundedReceiver<Event>,
    events_tx: mpsc::UnboundedSender<Event>,
    pool: Arc<ResourcePool>,
    cpu_queue: StageQueue,
    gpu_queue: StageQueue,
    running_cpu: HashMap<JobId, QueuedJob>,
    running_gpu: HashMap<JobId, QueuedJob>,
    log: Arc<CompletionLog>,
    max_gpu_concurrency: Arc<AtomicU32>,
    next_seq: u64,
    draining: bool,
    executor: E,
    spawner: S,
}

impl<E, S> Coordinator<E, S>
where
    E: PhaseExecutor,
    S: Spawn + Clone + Send + 'static,
{
    async fn run(mut self) {
        while let Some(event) = self.events.recv().await {
            match event {
                Event::Submit(job) => self.on_submit(job),
                Event::CpuDone(id) => self.on_cpu_done(id),
                Event::GpuDone(id) => self.on_gpu_done(id),
                Event::Cancel(id) => self.on_cancel(id),
                Event::Shutdown => {
                    tracing::debug!("scheduler handle dropped, draining");
                    self.draining = true;
                }
            }
            self.pump();
            if self.draining && self.is_idle() {
                break;
            }
        }
        tracing::info!("coordinator exited");
    }

    fn is_idle(&self) -> bool {
        self.cpu_queue.is_empty()
            && self.gpu_queue.is_empty()
            && self.running_cpu.is_empty()
            && self.running_gpu.is_empty()
    }

    fn on_submit(&mut self, mut job: QueuedJob) {
        if self.draining {
            settle(job, Err(SchedulerError::Shutdown));
            return;
        }
        job.seq = self.next_seq;
        self.next_seq += 1;
        tracing::debug!(job = job.id, priority = job.request.priority, "queued for cpu");
        self.cpu_queue.push(job);
    }

    fn on_cpu_done(&mut self, id: JobId) {
        let Some(job) = self.running_cpu.remove(&id) else {
            return;
        };
        self.pool.release(ResourceKind::Cpu, job.request.cpu_units);
        if job.cancel.is_cancelled() {
            tracing::debug!(job = id, "cancelled during cpu phase");
            settle(job, Err(SchedulerError::Cancelled));
        } else {
            tracing::debug!(job = id, "cpu phase complete, queued for gpu");
            self.gpu_queue.push(job);
        }
    }

    fn on_gpu_done(&mut self, id: JobId) {
        let Some(job) = self.running_gpu.remove(&id) else {
            return;
        };
        self.pool.release(ResourceKind::GpuMem, job.request.gpu_units);
        if job.cancel.is_cancelled() {
            tracing::debug!(job = id, "cancelled during gpu phase");
            settle(job, Err(SchedulerError::Cancelled));
        } else {
            tracing::info!(job = id, priority = job.request.priority, "job completed");
            self.log.record(CompletedJob {
                id: job.id,
                priority: job.request.priority,
                payload: job.request.payload.clone(),
            });
            let payload = job.request.payload.clone();
            settle(job, Ok(payload));
        }
    }

    /// Remove a still-queued job. Jobs mid-phase observe the cancellation
    /// trigger themselves and report back through `CpuDone`/`GpuDone`.
    fn on_cancel(&mut self, id: JobId) {
        let queued = self
            .cpu_queue
            .remove(id)
            .or_else(|| self.gpu_queue.remove(id));
        if let Some(job) = queued {
            tracing::debug!(job = id, "cancelled while queued");
            settle(job, Err(SchedulerError::Cancelled));
        }
    }

    /// Re-evaluate grant eligibility at both stages.
    ///
    /// Strict head-of-line policy: only the head of each queue is
    /// considered, so a small low-priority job never jumps ahead of a
    /// blocked higher-priority one.
    fn pump(&mut self) {
        loop {
            let Some(cost) = self.cpu_queue.head_cost() else {
                break;
            };
            if !self.pool.try_acquire(ResourceKind::Cpu, cost) {
                break;
            }
            let Some(job) = self.cpu_queue.pop() else {
                self.pool.release(ResourceKind::Cpu, cost);
                break;
            };
            self.start_cpu_phase(job);
        }

        loop {
            let Some(cost) = self.gpu_queue.head_cost() else {
                break;
            };
            if !self.pool.try_acquire(ResourceKind::GpuMem, cost) {
                break;
            }
            let Some(job) = self.gpu_queue.pop() else {
                self.pool.release(ResourceKind::GpuMem, cost);
                break;
            };
            self.start_gpu_phase(job);
        }
    }

    fn start_cpu_phase(&mut self, job: QueuedJob) {
        let id = job.id;
        tracing::debug!(job = id, units = job.request.cpu_units, "cpu granted");
        let executor = self.executor.clone();
        let request = job.request.clone();
        let cancel = Arc::clone(&job.cancel);
        let events = self.events_tx.clone();
        self.running_cpu.insert(id, job);

        self.spawner.spawn(async move {
            tokio::select! {
                () = executor.run_cpu_phase(&request) => {}
                () = cancel.cancelled() => {}
            }
            let _ = events.send(Event::CpuDone(id));
        });
    }

    fn start_gpu_phase(&mut self, job: QueuedJob) {
        let id = job.id;
        tracing::debug!(job = id, units = job.request.gpu_units, "gpu granted");
        let executor = self.executor.clone();
        let request = job.request.clone();
        let cancel = Arc::clone(&job.cancel);
        let events = self.events_tx.clone();
        self.running_gpu.insert(id, job);

        let active = u32::try_from(self.running_gpu.len()).unwrap_or(u32::MAX);
        self.max_gpu_concurrency.fetch_max(active, Ordering::AcqRel);

        self.spawner.spawn(async move {
            tokio::select! {
                () = executor.run_gpu_phase(&request) => {}
                () = cancel.cancelled() => {}
            }
            let _ = events.send(Event::GpuDone(id));
        });
    }
}

/// Settle a job's completion slot exactly once. A dropped receiver means the
/// caller abandoned the handle; the result is discarded.
fn settle(job: QueuedJob, result: Result<String, SchedulerError>) {
    let id = job.id;
    if job.done.send(result).is_err() {
        tracing::debug!(job = id, "completion receiver dropped");
    }
}
