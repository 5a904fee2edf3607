//! Admission control: reject unsatisfiable requests before they queue.
//!
//! A request that fails admission never occupies a priority slot, so an
//! impossible job cannot deadlock the pipeline behind it.

use crate::core::error::SchedulerError;
use crate::core::job::JobRequest;
use crate::core::resource_pool::{ResourceKind, ResourcePool};

/// Validate a request against pool totals.
///
/// Rejects empty payloads and requests whose per-phase cost exceeds the
/// configured total for that resource. Zero-unit requests are valid; they
/// acquire trivially when granted. Resource amounts are unsigned, so
/// negative amounts are ruled out by the type system.
///
/// # Errors
///
/// `InvalidRequest` for an empty payload, `Unsatisfiable` when a cost
/// exceeds the pool total. No state is mutated on rejection.
pub fn admit(request: &JobRequest, pool: &ResourcePool) -> Result<(), SchedulerError> {
    if request.payload.is_empty() {
        tracing::warn!(priority = request.priority, "rejected job with empty payload");
        return Err(SchedulerError::InvalidRequest(
            "payload must be a non-empty string".into(),
        ));
    }
    if request.cpu_units > pool.cpu_total() {
        tracing::warn!(
            requested = request.cpu_units,
            total = pool.cpu_total(),
            "rejected job exceeding cpu total"
        );
        return Err(SchedulerError::Unsatisfiable {
            kind: ResourceKind::Cpu,
            requested: request.cpu_units,
            total: pool.cpu_total(),
        });
    }
    if request.gpu_units > pool.gpu_total() {
        tracing::warn!(
            requested = request.gpu_units,
            total = pool.gpu_total(),
            "rejected job exceeding gpu total"
        );
        return Err(SchedulerError::Unsatisfiable {
            kind: ResourceKind::GpuMem,
            requested: request.gpu_units,
            total: pool.gpu_total(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_payload_is_invalid() {
        let pool = ResourcePool::new(2, 2);
        let err = admit(&JobRequest::new(0, ""), &pool).unwrap_err();
        assert!(matches!(err, SchedulerError::InvalidRequest(_)));
    }

    #[test]
    fn request_over_cpu_total_is_unsatisfiable() {
        let pool = ResourcePool::new(2, 2);
        let err = admit(&JobRequest::new(0, "p").with_cpu_units(3), &pool).unwrap_err();
        assert!(matches!(
            err,
            SchedulerError::Unsatisfiable {
                kind: ResourceKind::Cpu,
                requested: 3,
                total: 2,
            }
        ));
    }

    #[test]
    fn request_over_gpu_total_is_unsatisfiable() {
        let pool = ResourcePool::new(2, 2);
        let err = admit(&JobRequest::new(0, "p").with_gpu_units(5), &pool).unwrap_err();
        assert!(matches!(
            err,
            SchedulerError::Unsatisfiable {
                kind: ResourceKind::GpuMem,
                ..
            }
        ));
    }

    #[test]
    fn zero_resource_request_is_admitted() {
        let pool = ResourcePool::new(2, 2);
        assert!(admit(&JobRequest::new(0, "zero"), &pool).is_ok());
    }

    #[test]
    fn request_at_exact_totals_is_admitted() {
        let pool = ResourcePool::new(2, 2);
        let req = JobRequest::new(0, "p").with_cpu_units(2).with_gpu_units(2);
        assert!(admit(&req, &pool).is_ok());
    }
}
