//! Phase execution traits and the default simulated executor.

use async_trait::async_trait;

use crate::core::job::JobRequest;

/// Abstraction for the work performed in each pipeline phase.
///
/// The scheduler owns grant decisions and resource accounting; the executor
/// owns the work itself. Both phases are expected to be boundedly short and
/// must not acquire scheduler resources of their own.
///
/// # Example
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use inference_scheduler::core::{JobRequest, PhaseExecutor};
///
/// #[derive(Clone)]
/// struct LlmExecutor;
///
/// #[async_trait]
/// impl PhaseExecutor for LlmExecutor {
///     async fn run_cpu_phase(&self, request: &JobRequest) {
///         tokenize(&request.payload).await;
///     }
///
///     async fn run_gpu_phase(&self, request: &JobRequest) {
///         infer(&request.payload).await;
///     }
/// }
/// ```
#[async_trait]
pub trait PhaseExecutor: Send + Sync + Clone + 'static {
    /// Run the CPU-bound preprocessing phase. CPU units are held for the
    /// duration of this call.
    async fn run_cpu_phase(&self, request: &JobRequest);

    /// Run the GPU-bound inference phase. GPU memory units are held for the
    /// duration of this call.
    async fn run_gpu_phase(&self, request: &JobRequest);
}

/// Default executor that simulates both phases.
///
/// The CPU phase yields once; the GPU phase sleeps for the request's
/// `duration_hint`, or returns immediately when no hint is set. Useful for
/// tests and for exercising scheduling behavior without real workloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedExecutor;

#[async_trait]
impl PhaseExecutor for SimulatedExecutor {
    async fn run_cpu_phase(&self, _request: &JobRequest) {
        tokio::task::yield_now().await;
    }

    async fn run_gpu_phase(&self, request: &JobRequest) {
        if let Some(hint) = request.duration_hint {
            tokio::time::sleep(hint).await;
        }
    }
}
