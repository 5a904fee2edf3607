//! Benchmarks for the scheduler's hot bookkeeping paths.
//!
//! Benchmarks cover:
//! - Stage queue operations (push/pop/priority ordering, removal by id)
//! - Resource pool acquire/release

use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tokio::sync::oneshot;

use inference_scheduler::core::{
    CancelState, JobRequest, QueuedJob, ResourceKind, ResourcePool, StageQueue,
};

fn make_job(id: u64, priority: i32) -> QueuedJob {
    // The completion slot is never settled in benches; the receiver half is
    // dropped immediately.
    let (done, _rx) = oneshot::channel();
    QueuedJob {
        id,
        seq: id,
        request: JobRequest::new(priority, format!("bench-{id}"))
            .with_cpu_units(1)
            .with_gpu_units(1),
        done,
        cancel: Arc::new(CancelState::new()),
    }
}

fn bench_queue_push_pop(c: &mut Criterion) {
    let mut group = c.benchmark_group("stage_queue");
    for &depth in &[16u64, 256, 4096] {
        group.throughput(Throughput::Elements(depth));
        group.bench_with_input(BenchmarkId::new("push_pop", depth), &depth, |b, &depth| {
            b.iter(|| {
                let mut queue = StageQueue::new(ResourceKind::Cpu);
                for id in 0..depth {
                    // Mixed priorities exercise heap reordering.
                    let priority = i32::try_from(id % 7).unwrap();
                    queue.push(make_job(id, priority));
                }
                while let Some(job) = queue.pop() {
                    black_box(job.id);
                }
            });
        });
    }
    group.finish();
}

fn bench_queue_remove(c: &mut Criterion) {
    c.bench_function("stage_queue/remove_mid", |b| {
        b.iter(|| {
            let mut queue = StageQueue::new(ResourceKind::GpuMem);
            for id in 0..256u64 {
                queue.push(make_job(id, 0));
            }
            black_box(queue.remove(128));
        });
    });
}

fn bench_pool_acquire_release(c: &mut Criterion) {
    let pool = ResourcePool::new(1024, 1024);
    c.bench_function("resource_pool/acquire_release", |b| {
        b.iter(|| {
            assert!(pool.try_acquire(ResourceKind::Cpu, black_box(4)));
            pool.release(ResourceKind::Cpu, 4);
        });
    });
}

criterion_group!(
    benches,
    bench_queue_push_pop,
    bench_queue_remove,
    bench_pool_acquire_release
);
criterion_main!(benches);
