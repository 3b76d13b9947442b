//! Host introspection for the analysis report

use chrono::{DateTime, Local};
use serde::Serialize;
use std::time::Instant;
use sysinfo::{CpuRefreshKind, RefreshKind, System};

/// One-minute, five-minute and fifteen-minute load averages.
///
/// All zeros on platforms without a load average.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct LoadAverage {
    /// One minute
    pub one: f64,
    /// Five minutes
    pub five: f64,
    /// Fifteen minutes
    pub fifteen: f64,
}

/// Snapshot of the host and process
#[derive(Clone, Debug, Serialize)]
pub struct SystemInfo {
    /// When the snapshot was taken
    pub timestamp: DateTime<Local>,
    /// Host name, empty if unknown
    pub hostname: String,
    /// Operating system name
    pub os: String,
    /// Kernel release
    pub os_release: String,
    /// OS version string
    pub os_version: String,
    /// Target architecture
    pub architecture: String,
    /// CPU brand string of the first core
    pub processor: String,
    /// Logical CPU count
    pub cpu_cores: usize,
    /// System load average
    pub load_avg: LoadAverage,
    /// Current process id
    pub pid: u32,
    /// Seconds since `started_at`
    pub uptime_secs: f64,
}

impl SystemInfo {
    /// Collect a snapshot. `uptime_secs` is measured from `started_at`.
    pub fn collect(started_at: Instant) -> Self {
        let system =
            System::new_with_specifics(RefreshKind::new().with_cpu(CpuRefreshKind::new()));
        let processor = system
            .cpus()
            .first()
            .map(|cpu| cpu.brand().trim().to_string())
            .unwrap_or_default();
        let load = System::load_average();

        Self {
            timestamp: Local::now(),
            hostname: System::host_name().unwrap_or_default(),
            os: System::name().unwrap_or_else(|| std::env::consts::OS.to_string()),
            os_release: System::kernel_version().unwrap_or_default(),
            os_version: System::os_version().unwrap_or_default(),
            architecture: std::env::consts::ARCH.to_string(),
            processor,
            cpu_cores: num_cpus::get(),
            load_avg: LoadAverage {
                one: load.one,
                five: load.five,
                fifteen: load.fifteen,
            },
            pid: std::process::id(),
            uptime_secs: started_at.elapsed().as_secs_f64(),
        }
    }
}
