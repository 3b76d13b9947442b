use log::{debug, error, info};
use rust_workload_generator::{Orchestrator, OrchestratorConfig};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    let report = match Orchestrator::new(OrchestratorConfig::default()).and_then(|o| o.run()) {
        Ok(report) => report,
        Err(e) => {
            error!("workload run failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!(
        "{} of {} tasks recorded by {} workers ({} detached)",
        report.results_recorded,
        report.tasks_submitted,
        report.workers,
        report.shutdown.detached
    );
    match report.to_json() {
        Ok(json) => debug!("run report:\n{}", json),
        Err(e) => debug!("could not render run report: {}", e),
    }

    println!("{}", report.completion_line());
    ExitCode::SUCCESS
}
