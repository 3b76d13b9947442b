use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rust_workload_generator::analysis::{fibonacci, generate_hash_chain, prime_sieve};
use rust_workload_generator::prelude::*;
use rust_workload_generator::queue::{BoundedQueue, ChannelQueue};
use std::time::Duration;

fn fast_pool_config() -> WorkerPoolConfig {
    WorkerPoolConfig::new()
        .with_take_timeout(Duration::from_millis(10))
        .with_join_timeout(Duration::from_secs(5))
}

fn benchmark_pool_lifecycle(c: &mut Criterion) {
    c.bench_function("pool_start_stop_4", |b| {
        b.iter(|| {
            let pool = WorkerPool::new(fast_pool_config()).expect("Failed to create pool");
            pool.start(4).expect("Failed to start pool");
            pool.stop().expect("Failed to stop pool");
        });
    });
}

fn benchmark_task_bodies(c: &mut Criterion) {
    let mut group = c.benchmark_group("task_bodies");
    let executor = SyntheticExecutor::with_seed(7);

    for kind in [TaskKind::Hash, TaskKind::Math, TaskKind::Sort, TaskKind::Unknown] {
        let task = Task::new(kind, 42);
        group.bench_function(kind.as_str(), |b| {
            b.iter(|| executor.execute(black_box(&task)).expect("task failed"));
        });
    }

    group.finish();
}

fn benchmark_queues(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue_put_take_1000");

    group.bench_function("unbounded", |b| {
        let queue = ChannelQueue::unbounded();
        b.iter(|| {
            for id in 0..1000 {
                queue.put(Task::new(TaskKind::Hash, id)).expect("put failed");
            }
            while let Some(task) = queue.try_take() {
                black_box(task);
            }
        });
    });

    group.bench_function("bounded", |b| {
        let queue = BoundedQueue::new(1000);
        b.iter(|| {
            for id in 0..1000 {
                queue.put(Task::new(TaskKind::Hash, id)).expect("put failed");
            }
            while let Some(task) = queue.try_take() {
                black_box(task);
            }
        });
    });

    group.finish();
}

fn benchmark_batch_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_throughput");
    group.sample_size(10);

    for workers in [1usize, 2, 4] {
        group.bench_function(format!("100_tasks_{}_workers", workers), |b| {
            b.iter_batched(
                || {
                    let pool = WorkerPool::new(fast_pool_config().with_parallelism_limit(workers))
                        .expect("Failed to create pool");
                    pool.start(workers).expect("Failed to start pool");
                    pool
                },
                |pool| {
                    let orchestrator = Orchestrator::new(
                        OrchestratorConfig::new().with_seed(1).with_analysis(false),
                    )
                    .expect("Failed to build orchestrator");
                    pool.submit_batch(orchestrator.batch())
                        .expect("Failed to submit batch");
                    pool.metrics().wait_for_total(100, Duration::from_secs(30));
                    pool.stop().expect("Failed to stop pool");
                },
                BatchSize::PerIteration,
            );
        });
    }

    group.finish();
}

fn benchmark_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis");
    group.bench_function("hash_chain_500", |b| b.iter(|| generate_hash_chain(black_box(500))));
    group.bench_function("fibonacci_40", |b| b.iter(|| fibonacci(black_box(40))));
    group.bench_function("prime_sieve_20000", |b| b.iter(|| prime_sieve(black_box(20_000))));
    group.finish();
}

criterion_group!(
    benches,
    benchmark_pool_lifecycle,
    benchmark_task_bodies,
    benchmark_queues,
    benchmark_batch_throughput,
    benchmark_analysis
);
criterion_main!(benches);
