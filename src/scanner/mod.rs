//! Scanner module - host discovery and port probing.
//!
//! Host scans expand a target into a host list and push every address
//! through the [`LivenessProber`]; port scans push a port list through a
//! [`TcpConnectScanner`] bound to one host. Both run under a
//! [`BatchScheduler`] and return a report with results in ascending order.

pub mod batch;
pub mod liveness;
pub mod ping;
pub mod tcp;
pub mod traits;

use crate::types::{PortList, ScanId, TargetSpec};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::net::{IpAddr, Ipv4Addr};
use std::time::{Duration, Instant};
use tracing::info;

pub use batch::{run_batched, BatchScheduler, StopSignal};
pub use liveness::LivenessProber;
pub use ping::{PingFacility, PingOutcome, SystemPing};
pub use tcp::TcpConnectScanner;
pub use traits::{HostResult, HostStatus, LivenessMethod, PortResult, PortStatus, Scanner};

/// Aggregate counts of a finished scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSummary {
    pub total: usize,
    pub active_or_open: usize,
    pub inactive_or_closed: usize,
    pub duration_ms: u64,
}

/// A liveness sweep over a target specification.
#[derive(Debug, Clone)]
pub struct HostScanJob {
    pub id: ScanId,
    pub target: TargetSpec,
    pub timeout_secs: u64,
}

/// A port sweep against one host.
#[derive(Debug, Clone)]
pub struct PortScanJob {
    pub id: ScanId,
    pub ip: Ipv4Addr,
    pub ports: PortList,
    pub timeout: Duration,
}

/// Result of a host scan, shaped as the `scan-hosts` response body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostScanReport {
    pub success: bool,
    pub scan_id: ScanId,
    pub target: String,
    /// Liveness technique in effect when the scan finished.
    pub method: &'static str,
    pub total_hosts: usize,
    pub active_hosts: usize,
    /// Milliseconds.
    pub scan_duration: u64,
    pub timestamp: DateTime<Utc>,
    pub results: Vec<HostResult>,
}

impl HostScanReport {
    /// Summary counts of this scan.
    pub fn summary(&self) -> ScanSummary {
        ScanSummary {
            total: self.total_hosts,
            active_or_open: self.active_hosts,
            inactive_or_closed: self.total_hosts - self.active_hosts,
            duration_ms: self.scan_duration,
        }
    }
}

/// Result of a port scan, shaped as the `scan-ports` response body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortScanReport {
    pub scan_id: ScanId,
    pub ip: Ipv4Addr,
    pub ports: Vec<PortResult>,
    /// Milliseconds.
    pub scan_time: u64,
    pub open_count: usize,
    /// Every port that is not open, filtered ones included.
    pub closed_count: usize,
    pub filtered_count: usize,
    pub timestamp: DateTime<Utc>,
}

impl PortScanReport {
    /// Summary counts of this scan.
    pub fn summary(&self) -> ScanSummary {
        ScanSummary {
            total: self.ports.len(),
            active_or_open: self.open_count,
            inactive_or_closed: self.closed_count,
            duration_ms: self.scan_time,
        }
    }
}

/// Probe the liveness of every host in the job's target.
pub async fn scan_hosts(
    job: HostScanJob,
    prober: &LivenessProber,
    scheduler: &BatchScheduler,
) -> HostScanReport {
    let start_time = Instant::now();
    let hosts = job.target.expand();
    info!(
        target = %job.target,
        hosts = hosts.len(),
        batch_size = scheduler.batch_size(),
        method = prober.mode_name(),
        "starting host scan"
    );

    let mut results = scheduler
        .run(hosts, |address| prober.probe_host(address, job.timeout_secs))
        .await;
    results.sort_by_key(|r| u32::from(r.address));

    let active_hosts = results.iter().filter(|r| r.is_active()).count();
    let duration = start_time.elapsed().as_millis() as u64;
    info!(active = active_hosts, total = results.len(), duration_ms = duration, "host scan complete");

    HostScanReport {
        success: true,
        scan_id: job.id,
        target: job.target.to_string(),
        method: prober.mode_name(),
        total_hosts: results.len(),
        active_hosts,
        scan_duration: duration,
        timestamp: Utc::now(),
        results,
    }
}

/// Probe every port of the job against its host.
pub async fn scan_ports(job: PortScanJob, scheduler: &BatchScheduler) -> PortScanReport {
    let start_time = Instant::now();
    let scanner = TcpConnectScanner::new(IpAddr::V4(job.ip), job.timeout);
    info!(
        ip = %job.ip,
        ports = job.ports.len(),
        batch_size = scheduler.batch_size(),
        "starting port scan"
    );

    let mut results = scheduler
        .run(job.ports.into_iter().collect(), |port| scanner.scan_port(port))
        .await;
    results.sort_by_key(|r| r.port);

    let open_count = results.iter().filter(|r| r.is_open()).count();
    let filtered_count = results
        .iter()
        .filter(|r| r.status == PortStatus::Filtered)
        .count();
    let duration = start_time.elapsed().as_millis() as u64;
    info!(open = open_count, total = results.len(), duration_ms = duration, "port scan complete");

    PortScanReport {
        scan_id: job.id,
        ip: job.ip,
        closed_count: results.len() - open_count,
        open_count,
        filtered_count,
        scan_time: duration,
        timestamp: Utc::now(),
        ports: results,
    }
}
