//! Dual-resource capacity accounting.
//!
//! Tracks free CPU-thread and GPU-memory capacity with lock-free `AtomicU32`
//! counters so the observability gauges can be read concurrently while the
//! coordinator grants and releases units.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

/// The two independent resources a job consumes, one per phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// CPU thread capacity, held during preprocessing.
    Cpu,
    /// GPU memory capacity, held during inference.
    GpuMem,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => write!(f, "cpu"),
            Self::GpuMem => write!(f, "gpu-mem"),
        }
    }
}

/// Capacity counters for the CPU and GPU resources.
///
/// Free counters only move through `try_acquire` and `release`; the grant
/// protocol guarantees a release matches a prior acquire, so free never
/// exceeds total.
pub struct ResourcePool {
    cpu_total: u32,
    gpu_total: u32,
    cpu_free: AtomicU32,
    gpu_free: AtomicU32,
}

impl ResourcePool {
    /// Create a pool with fixed totals and all capacity free.
    pub const fn new(cpu_total: u32, gpu_total: u32) -> Self {
        Self {
            cpu_total,
            gpu_total,
            cpu_free: AtomicU32::new(cpu_total),
            gpu_free: AtomicU32::new(gpu_total),
        }
    }

    /// Configured CPU thread total.
    pub const fn cpu_total(&self) -> u32 {
        self.cpu_total
    }

    /// Configured GPU memory total.
    pub const fn gpu_total(&self) -> u32 {
        self.gpu_total
    }

    /// Free CPU thread units at this instant.
    pub fn cpu_free(&self) -> u32 {
        self.cpu_free.load(Ordering::Acquire)
    }

    /// Free GPU memory units at this instant.
    pub fn gpu_free(&self) -> u32 {
        self.gpu_free.load(Ordering::Acquire)
    }

    /// Configured total for `kind`.
    pub const fn total(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Cpu => self.cpu_total,
            ResourceKind::GpuMem => self.gpu_total,
        }
    }

    const fn counter(&self, kind: ResourceKind) -> &AtomicU32 {
        match kind {
            ResourceKind::Cpu => &self.cpu_free,
            ResourceKind::GpuMem => &self.gpu_free,
        }
    }

    /// Atomically deduct `amount` from the free counter for `kind`.
    ///
    /// Succeeds only if the full amount fits; on failure nothing changes.
    /// A zero-unit acquire always succeeds.
    pub fn try_acquire(&self, kind: ResourceKind, amount: u32) -> bool {
        let counter = self.counter(kind);
        let mut current = counter.load(Ordering::Acquire);
        loop {
            if amount > current {
                return false;
            }
            match counter.compare_exchange_weak(
                current,
                current - amount,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    tracing::trace!(%kind, amount, free = current - amount, "units acquired");
                    return true;
                }
                Err(actual) => current = actual,
            }
        }
    }

    /// Return `amount` units to the free counter for `kind`.
    ///
    /// Callers only release what they previously acquired, so the counter
    /// cannot climb past the configured total.
    pub fn release(&self, kind: ResourceKind, amount: u32) {
        let counter = self.counter(kind);
        let previous = counter.fetch_add(amount, Ordering::AcqRel);
        debug_assert!(
            previous + amount <= self.total(kind),
            "release of {amount} {kind} units exceeds pool total"
        );
        tracing::trace!(%kind, amount, free = previous + amount, "units released");
    }
}

impl fmt::Debug for ResourcePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourcePool")
            .field("cpu_free", &self.cpu_free())
            .field("cpu_total", &self.cpu_total)
            .field("gpu_free", &self.gpu_free())
            .field("gpu_total", &self.gpu_total)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_deducts_and_release_restores() {
        let pool = ResourcePool::new(4, 8);
        assert!(pool.try_acquire(ResourceKind::Cpu, 3));
        assert_eq!(pool.cpu_free(), 1);
        assert!(pool.try_acquire(ResourceKind::GpuMem, 8));
        assert_eq!(pool.gpu_free(), 0);

        pool.release(ResourceKind::Cpu, 3);
        pool.release(ResourceKind::GpuMem, 8);
        assert_eq!(pool.cpu_free(), 4);
        assert_eq!(pool.gpu_free(), 8);
    }

    #[test]
    fn failed_acquire_has_no_side_effect() {
        let pool = ResourcePool::new(2, 2);
        assert!(!pool.try_acquire(ResourceKind::Cpu, 3));
        assert_eq!(pool.cpu_free(), 2);
    }

    #[test]
    fn zero_unit_acquire_always_succeeds() {
        let pool = ResourcePool::new(1, 1);
        assert!(pool.try_acquire(ResourceKind::Cpu, 1));
        assert_eq!(pool.cpu_free(), 0);
        // Exhausted, but a zero-cost grant still fits.
        assert!(pool.try_acquire(ResourceKind::Cpu, 0));
        assert_eq!(pool.cpu_free(), 0);
    }

    #[test]
    fn counters_are_independent() {
        let pool = ResourcePool::new(2, 2);
        assert!(pool.try_acquire(ResourceKind::Cpu, 2));
        assert_eq!(pool.gpu_free(), 2);
        assert!(pool.try_acquire(ResourceKind::GpuMem, 1));
        assert_eq!(pool.cpu_free(), 0);
        assert_eq!(pool.gpu_free(), 1);
    }
}
