//! Builders to construct a scheduler from configuration.

use crate::config::SchedulerConfig;
use crate::core::{PhaseExecutor, Scheduler, SchedulerError};
use crate::runtime::{Spawn, TokioSpawner};

/// Build a scheduler from validated configuration with an explicit spawner.
///
/// # Errors
///
/// `Config` when validation fails; the scheduler is not constructed.
pub fn build_scheduler_with<E, S>(
    cfg: &SchedulerConfig,
    executor: E,
    spawner: S,
) -> Result<Scheduler, SchedulerError>
where
    E: PhaseExecutor,
    S: Spawn + Clone + Send + 'static,
{
    cfg.validate().map_err(SchedulerError::Config)?;
    Ok(Scheduler::new(cfg.cpu_total, cfg.gpu_total, executor, spawner))
}

/// Build a scheduler from configuration on the current tokio runtime.
///
/// # Errors
///
/// `Config` when validation fails.
///
/// # Panics
///
/// Panics when called outside a tokio runtime.
pub fn build_scheduler<E>(cfg: &SchedulerConfig, executor: E) -> Result<Scheduler, SchedulerError>
where
    E: PhaseExecutor,
{
    build_scheduler_with(cfg, executor, TokioSpawner::current())
}
