//! Tests for cooperative shutdown

use rust_workload_generator::prelude::*;
use rust_workload_generator::CancellationReason;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn config(take_timeout: Duration) -> WorkerPoolConfig {
    WorkerPoolConfig::new()
        .with_parallelism_limit(8)
        .with_take_timeout(take_timeout)
        .with_join_timeout(Duration::from_secs(2))
}

#[test]
fn test_idle_workers_exit_within_take_timeout() {
    let take_timeout = Duration::from_millis(100);
    let pool = WorkerPool::new(config(take_timeout)).expect("Failed to create pool");
    pool.start(4).expect("Failed to start pool");

    // Let every worker settle into its queue wait
    thread::sleep(Duration::from_millis(30));

    let start = Instant::now();
    let summary = pool.stop().expect("Failed to stop pool");
    let elapsed = start.elapsed();

    assert_eq!(summary, ShutdownSummary { joined: 4, detached: 0 });
    // Each worker needs at most one timeout to notice; joins overlap
    assert!(
        elapsed < take_timeout * 2 + Duration::from_millis(100),
        "stop took {:?}",
        elapsed
    );
}

#[test]
fn test_shorter_take_timeout_stops_faster() {
    let measure = |timeout: Duration| {
        let pool = WorkerPool::new(config(timeout)).expect("Failed to create pool");
        pool.start(2).expect("Failed to start pool");
        thread::sleep(Duration::from_millis(20));
        let start = Instant::now();
        pool.stop().expect("Failed to stop pool");
        start.elapsed()
    };

    let fast = measure(Duration::from_millis(10));
    let slow = measure(Duration::from_millis(400));
    assert!(fast < slow, "fast={:?} slow={:?}", fast, slow);
}

#[test]
fn test_in_flight_task_is_not_interrupted() {
    let finished = Arc::new(AtomicBool::new(false));
    let finished_clone = Arc::clone(&finished);
    let started = Arc::new(AtomicBool::new(false));
    let started_clone = Arc::clone(&started);

    let executor = Arc::new(FnExecutor::new(move |task: &Task| {
        started_clone.store(true, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(150));
        finished_clone.store(true, Ordering::SeqCst);
        Ok(TaskOutput::Sum(task.id()))
    }));
    let pool = WorkerPool::with_executor(config(Duration::from_millis(20)), executor)
        .expect("Failed to create pool");
    pool.start(1).expect("Failed to start pool");
    pool.submit(Task::new(TaskKind::Math, 1))
        .expect("Failed to submit task");

    while !started.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_millis(1));
    }
    let summary = pool.stop().expect("Failed to stop pool");

    assert_eq!(summary.joined, 1);
    assert!(finished.load(Ordering::SeqCst));
    assert_eq!(pool.metrics().total(), 1);
}

#[test]
fn test_queued_tasks_are_not_drained() {
    let gate = Arc::new(AtomicBool::new(false));
    let gate_clone = Arc::clone(&gate);

    let executor = Arc::new(FnExecutor::new(move |task: &Task| {
        while !gate_clone.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(1));
        }
        Ok(TaskOutput::Sum(task.id()))
    }));
    let pool = WorkerPool::with_executor(config(Duration::from_millis(20)), executor)
        .expect("Failed to create pool");
    pool.start(1).expect("Failed to start pool");
    pool.submit_batch((0..20).map(|id| Task::new(TaskKind::Math, id)))
        .expect("Failed to submit tasks");

    // Wait for the single worker to block inside task 0
    while pool.worker_states()[0] != WorkerState::Executing {
        thread::sleep(Duration::from_millis(1));
    }

    let releaser = {
        let gate = Arc::clone(&gate);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            gate.store(true, Ordering::SeqCst);
        })
    };
    pool.stop().expect("Failed to stop pool");
    releaser.join().unwrap();

    assert_eq!(pool.metrics().total(), 1);
    assert_eq!(pool.queue_len(), 19);
}

#[test]
fn test_token_reason_first_wins() {
    let token = CancellationToken::new();
    token.cancel_with_reason(CancellationReason::PoolStopped);
    token.cancel_with_reason(CancellationReason::PoolDropped);

    assert!(token.is_cancelled());
    assert_eq!(token.reason(), Some(CancellationReason::PoolStopped));
    assert!(matches!(token.check(), Err(WorkloadError::Cancelled { .. })));
}

#[test]
fn test_cancellation_visible_across_threads() {
    let token = CancellationToken::new();
    let observers: Vec<_> = (0..4)
        .map(|_| {
            let t = token.clone();
            thread::spawn(move || {
                let deadline = Instant::now() + Duration::from_secs(2);
                while !t.is_cancelled() && Instant::now() < deadline {
                    thread::sleep(Duration::from_millis(1));
                }
                t.is_cancelled()
            })
        })
        .collect();

    thread::sleep(Duration::from_millis(20));
    token.cancel();
    for o in observers {
        assert!(o.join().unwrap());
    }
}
