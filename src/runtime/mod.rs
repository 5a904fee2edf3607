//! Runtime adapters for spawning coordinator and phase tasks.

mod tokio_spawner;

use std::future::Future;

pub use tokio_spawner::TokioSpawner;

/// Abstraction for spawning task execution on a runtime.
///
/// The scheduler spawns its coordinator and one task per granted phase
/// through this seam, so embedders can route work onto a runtime of their
/// choosing.
pub trait Spawn {
    /// Spawn an async task that runs to completion in the background.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}
