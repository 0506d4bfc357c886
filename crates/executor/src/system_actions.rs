//! Read-only system health queries.
//!
//! All of these are Ok on success even when the answer is empty; Failed
//! is reserved for OS-level errors.

use crate::traits::ActionHandler;
use adjutant_core::{Command, CommandKind, ExecutionResult, RiskClass};
use async_trait::async_trait;
use serde::Serialize;
use sysinfo::{Disks, System};
use tokio::task;

/// One capture of system health, shared by the `system analysis` command,
/// the `/status` directive and the HTTP status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SystemSnapshot {
    pub cpu_percent: f32,
    pub memory_used_mb: u64,
    pub memory_total_mb: u64,
    pub memory_percent: f32,
    pub disk_percent: f32,
    pub battery_percent: Option<u8>,
    pub process_count: usize,
    pub uptime_seconds: u64,
}

impl SystemSnapshot {
    /// Blocking capture; call through `spawn_blocking`.
    pub fn capture() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();
        // Two refreshes spaced by the minimum interval give a real CPU
        // reading instead of zero.
        std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        sys.refresh_cpu();

        let memory_used_mb = sys.used_memory() / 1024 / 1024;
        let memory_total_mb = sys.total_memory() / 1024 / 1024;
        let memory_percent = if sys.total_memory() > 0 {
            sys.used_memory() as f32 / sys.total_memory() as f32 * 100.0
        } else {
            0.0
        };

        let disks = Disks::new_with_refreshed_list();
        let disk_percent = disks
            .iter()
            .next()
            .map(|disk| {
                let total = disk.total_space();
                let available = disk.available_space();
                if total > 0 {
                    ((total - available) as f64 / total as f64 * 100.0) as f32
                } else {
                    0.0
                }
            })
            .unwrap_or(0.0);

        Self {
            cpu_percent: sys.global_cpu_info().cpu_usage(),
            memory_used_mb,
            memory_total_mb,
            memory_percent,
            disk_percent,
            battery_percent: read_battery_percent(),
            process_count: sys.processes().len(),
            uptime_seconds: System::uptime(),
        }
    }

    pub fn render(&self) -> String {
        let battery = self
            .battery_percent
            .map(|p| format!("{}%", p))
            .unwrap_or_else(|| "n/a".to_string());
        format!(
            "CPU: {:.1}%\nMemory: {}/{} MB ({:.1}%)\nDisk: {:.1}%\nBattery: {}\nProcesses: {}\nUptime: {}s",
            self.cpu_percent,
            self.memory_used_mb,
            self.memory_total_mb,
            self.memory_percent,
            self.disk_percent,
            battery,
            self.process_count,
            self.uptime_seconds
        )
    }
}

fn read_battery_percent() -> Option<u8> {
    #[cfg(target_os = "linux")]
    {
        std::fs::read_to_string("/sys/class/power_supply/BAT0/capacity")
            .ok()
            .and_then(|s| s.trim().parse().ok())
    }
    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

/// Async capture used by the channels crate.
pub async fn status_snapshot() -> Result<SystemSnapshot, String> {
    task::spawn_blocking(SystemSnapshot::capture)
        .await
        .map_err(|e| e.to_string())
}

pub struct SystemStatusAction;

#[async_trait]
impl ActionHandler for SystemStatusAction {
    fn kind(&self) -> CommandKind {
        CommandKind::SystemStatus
    }

    fn risk(&self) -> RiskClass {
        RiskClass::ReadOnly
    }

    async fn execute(&self, _command: &Command) -> ExecutionResult {
        match status_snapshot().await {
            Ok(snapshot) => ExecutionResult::ok(snapshot.render()),
            Err(e) => ExecutionResult::failed(format!("status capture failed: {}", e)),
        }
    }
}

pub struct ListProcessesAction;

#[async_trait]
impl ActionHandler for ListProcessesAction {
    fn kind(&self) -> CommandKind {
        CommandKind::ListProcesses
    }

    fn risk(&self) -> RiskClass {
        RiskClass::ReadOnly
    }

    async fn execute(&self, _command: &Command) -> ExecutionResult {
        let listing = task::spawn_blocking(|| {
            let mut system = System::new_all();
            system.refresh_all();

            let mut rows: Vec<(u32, String, f32, u64)> = system
                .processes()
                .iter()
                .map(|(pid, process)| {
                    (
                        pid.as_u32(),
                        process.name().to_string(),
                        process.cpu_usage(),
                        process.memory() / 1024 / 1024,
                    )
                })
                .collect();
            rows.sort_by(|a, b| b.2.total_cmp(&a.2));

            let mut out = format!("{:>8}  {:<32} {:>6} {:>9}\n", "PID", "NAME", "CPU%", "MEM(MB)");
            for (pid, name, cpu, mem) in rows {
                out.push_str(&format!("{:>8}  {:<32} {:>6.1} {:>9}\n", pid, name, cpu, mem));
            }
            out
        })
        .await;

        match listing {
            // Zero processes would still be a valid Ok with just the header.
            Ok(listing) => ExecutionResult::ok(listing),
            Err(e) => ExecutionResult::failed(format!("process scan failed: {}", e)),
        }
    }
}

pub struct DiskUsageAction;

#[async_trait]
impl ActionHandler for DiskUsageAction {
    fn kind(&self) -> CommandKind {
        CommandKind::DiskUsage
    }

    fn risk(&self) -> RiskClass {
        RiskClass::ReadOnly
    }

    async fn execute(&self, _command: &Command) -> ExecutionResult {
        let report = task::spawn_blocking(|| {
            let disks = Disks::new_with_refreshed_list();
            let mut out = String::from("Disk usage:\n");
            for disk in disks.iter() {
                let total = disk.total_space();
                let available = disk.available_space();
                let used = total.saturating_sub(available);
                let percent = if total > 0 {
                    used as f64 / total as f64 * 100.0
                } else {
                    0.0
                };
                out.push_str(&format!(
                    "  {} on {}: {:.2}/{:.2} GB used ({:.1}%), {:.2} GB free\n",
                    disk.name().to_string_lossy(),
                    disk.mount_point().display(),
                    used as f64 / 1e9,
                    total as f64 / 1e9,
                    percent,
                    available as f64 / 1e9,
                ));
            }
            out
        })
        .await;

        match report {
            Ok(report) => ExecutionResult::ok(report),
            Err(e) => ExecutionResult::failed(format!("disk scan failed: {}", e)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use adjutant_core::ExecStatus;

    #[tokio::test]
    async fn status_reports_core_metrics() {
        let result = SystemStatusAction.execute(&Command::SystemStatus).await;
        assert_eq!(result.status, ExecStatus::Ok);
        assert!(result.stdout.contains("CPU:"));
        assert!(result.stdout.contains("Memory:"));
        assert!(result.stdout.contains("Disk:"));
    }

    #[tokio::test]
    async fn process_listing_contains_header_and_rows() {
        let result = ListProcessesAction.execute(&Command::ListProcesses).await;
        assert_eq!(result.status, ExecStatus::Ok);
        assert!(result.stdout.contains("PID"));
        assert!(result.stdout.lines().count() > 1);
    }

    #[tokio::test]
    async fn disk_usage_is_ok() {
        let result = DiskUsageAction.execute(&Command::DiskUsage).await;
        assert_eq!(result.status, ExecStatus::Ok);
        assert!(result.stdout.starts_with("Disk usage:"));
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let snapshot = SystemSnapshot {
            cpu_percent: 12.5,
            memory_used_mb: 2048,
            memory_total_mb: 8192,
            memory_percent: 25.0,
            disk_percent: 40.0,
            battery_percent: Some(88),
            process_count: 120,
            uptime_seconds: 3600,
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["battery_percent"], 88);
        assert_eq!(json["memory_total_mb"], 8192);
    }
}
