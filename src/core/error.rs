//! Error types for scheduler operations.

use thiserror::Error;

use crate::core::resource_pool::ResourceKind;

/// Errors produced by scheduler components.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Request is malformed and must not be retried with the same arguments.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Request exceeds pool totals and can never be satisfied.
    #[error("requested {requested} {kind} units exceeds pool total of {total}")]
    Unsatisfiable {
        /// Resource the request exceeded.
        kind: ResourceKind,
        /// Units the job asked for.
        requested: u32,
        /// Configured pool total for that resource.
        total: u32,
    },
    /// The submitting caller withdrew interest before completion.
    #[error("job cancelled")]
    Cancelled,
    /// The scheduler shut down before the job could be settled.
    #[error("scheduler shut down")]
    Shutdown,
    /// Configuration was rejected during construction.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
