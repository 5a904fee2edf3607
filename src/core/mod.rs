//! Core scheduling abstractions and capacity accounting.

pub mod admission;
pub mod error;
pub mod executor;
pub mod job;
pub mod log;
pub mod queue;
pub mod resource_pool;
pub mod scheduler;

pub use admission::admit;
pub use error::{AppResult, SchedulerError};
pub use executor::{PhaseExecutor, SimulatedExecutor};
pub use job::{CancelState, CompletedJob, JobId, JobRequest};
pub use log::CompletionLog;
pub use queue::{QueuedJob, StageQueue};
pub use resource_pool::{ResourceKind, ResourcePool};
pub use scheduler::{Canceller, JobHandle, Scheduler};
