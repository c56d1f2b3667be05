//! Request handling shared by the HTTP server and the CLI.
//!
//! A [`ScanService`] validates a raw request, fills in defaults from
//! [`Settings`], runs the scan and returns the report. Validation failures
//! surface as a single [`RequestError`]; probe failures never do.

use crate::config::Settings;
use crate::error::RequestError;
use crate::scanner::{
    self, BatchScheduler, HostScanJob, HostScanReport, LivenessProber, PortScanJob,
    PortScanReport, StopSignal,
};
use crate::types::{PortList, ScanId, TargetSpec};
use indicatif::ProgressBar;
use serde::Deserialize;
use std::net::Ipv4Addr;
use std::sync::Arc;
use tracing::{info_span, Instrument};

/// Body of a `scan-hosts` request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostScanRequest {
    pub target: Option<String>,
    pub ip_range: Option<String>,
    pub single_ip: Option<String>,
    /// Milliseconds.
    pub timeout: Option<u64>,
    pub batch_size: Option<usize>,
}

impl HostScanRequest {
    /// First non-blank target field, in the order `target`, `ipRange`, `singleIp`.
    pub fn target_spec(&self) -> Result<&str, RequestError> {
        [&self.target, &self.ip_range, &self.single_ip]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .ok_or(RequestError::MissingTarget)
    }
}

/// Body of a `scan-ports` request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortScanRequest {
    pub ip: Option<String>,
    pub preset: Option<String>,
    pub ports: Option<String>,
    /// Milliseconds.
    pub timeout: Option<u64>,
}

/// Optional hooks for long-running scans started from the CLI.
#[derive(Clone, Default)]
pub struct ScanHooks {
    pub stop: Option<StopSignal>,
    pub progress: Option<ProgressBar>,
}

/// Entry point for scan requests.
pub struct ScanService {
    settings: Settings,
    prober: Arc<LivenessProber>,
}

impl ScanService {
    /// Service using the system `ping` facility.
    pub fn new(settings: Settings) -> Self {
        let prober = Arc::new(LivenessProber::new(&settings));
        Self::with_prober(settings, prober)
    }

    /// Service using an existing liveness prober.
    pub fn with_prober(settings: Settings, prober: Arc<LivenessProber>) -> Self {
        Self { settings, prober }
    }

    /// Get the active settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Validate and run a host scan.
    pub async fn scan_hosts(&self, request: &HostScanRequest) -> Result<HostScanReport, RequestError> {
        self.scan_hosts_with(request, ScanHooks::default()).await
    }

    /// Validate and run a host scan with CLI hooks.
    pub async fn scan_hosts_with(
        &self,
        request: &HostScanRequest,
        hooks: ScanHooks,
    ) -> Result<HostScanReport, RequestError> {
        let target = TargetSpec::parse(request.target_spec()?)?;
        let timeout = self
            .settings
            .clamp_timeout(request.timeout, self.settings.host_timeout_ms);
        let batch_size = self
            .settings
            .clamp_batch_size(request.batch_size, self.settings.host_batch_size);

        let job = HostScanJob {
            id: ScanId::new(),
            target,
            timeout_secs: timeout.as_millis().div_ceil(1000).max(1) as u64,
        };
        let span = info_span!("scan_hosts", scan_id = %job.id);
        let scheduler = scheduler_with(batch_size, hooks);

        Ok(scanner::scan_hosts(job, &self.prober, &scheduler)
            .instrument(span)
            .await)
    }

    /// Validate and run a port scan.
    pub async fn scan_ports(&self, request: &PortScanRequest) -> Result<PortScanReport, RequestError> {
        self.scan_ports_with(request, ScanHooks::default()).await
    }

    /// Validate and run a port scan with CLI hooks.
    pub async fn scan_ports_with(
        &self,
        request: &PortScanRequest,
        hooks: ScanHooks,
    ) -> Result<PortScanReport, RequestError> {
        let ip = request
            .ip
            .as_deref()
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .ok_or(RequestError::MissingIp)?;
        let ip: Ipv4Addr = ip
            .parse()
            .map_err(|_| RequestError::InvalidIp(ip.to_string()))?;
        let ports = PortList::resolve(request.preset.as_deref(), request.ports.as_deref())?;
        let timeout = self
            .settings
            .clamp_timeout(request.timeout, self.settings.port_timeout_ms);

        let job = PortScanJob {
            id: ScanId::new(),
            ip,
            ports,
            timeout,
        };
        let span = info_span!("scan_ports", scan_id = %job.id);
        let scheduler = scheduler_with(self.settings.port_batch_size, hooks);

        Ok(scanner::scan_ports(job, &scheduler).instrument(span).await)
    }
}

fn scheduler_with(batch_size: usize, hooks: ScanHooks) -> BatchScheduler {
    let mut scheduler = BatchScheduler::new(batch_size);
    if let Some(stop) = hooks.stop {
        scheduler = scheduler.with_stop_signal(stop);
    }
    if let Some(progress) = hooks.progress {
        scheduler = scheduler.with_progress(progress);
    }
    scheduler
}
