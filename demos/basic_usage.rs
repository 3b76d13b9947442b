//! Basic worker pool usage example
//!
//! Demonstrates pool creation, task submission, per-worker results and a
//! full orchestrated run.
//!
//! Run with: cargo run --example basic_usage

use rust_workload_generator::prelude::*;
use std::time::Duration;

fn main() -> Result<()> {
    env_logger::init();
    println!("=== Workload Generator - Basic Usage Example ===\n");

    let config = WorkerPoolConfig::new()
        .with_thread_name_prefix("demo")
        .with_take_timeout(Duration::from_millis(100));
    let pool = WorkerPool::new(config)?;

    let started = pool.start(4)?;
    println!("1. Started {} workers", started);

    println!("\n2. Submitting tasks:");
    for id in 0..12 {
        let kind = TaskKind::SUBMITTABLE[id as usize % TaskKind::SUBMITTABLE.len()];
        pool.submit(Task::new(kind, id))?;
    }
    println!("   Submitted {} tasks", pool.tasks_submitted());

    if !pool.metrics().wait_for_total(12, Duration::from_secs(10)) {
        println!("   (not every task finished in time)");
    }

    println!("\n3. Stopping pool");
    let summary = pool.stop()?;
    println!(
        "   {} workers joined, {} detached, {} tasks left queued",
        summary.joined,
        summary.detached,
        pool.queue_len()
    );

    println!("\n4. Per-worker results:");
    for (worker, records) in pool.metrics().snapshot() {
        println!("   Worker {}: {} results", worker, records.len());
        for record in records {
            println!(
                "     task {:>2} {:<5} -> {} ({:?})",
                record.task_id, record.kind, record.output, record.elapsed
            );
        }
    }

    println!("\n5. Orchestrated run:");
    let report = Orchestrator::new(
        OrchestratorConfig::new().with_drain_wait(Duration::from_secs(10)),
    )?
    .run()?;
    println!(
        "   {} of {} tasks recorded by {} workers",
        report.results_recorded, report.tasks_submitted, report.workers
    );
    println!("   {}", report.completion_line());

    println!("\n=== Example completed successfully ===");
    Ok(())
}
