//! Host liveness probing: ICMP first, TCP connect as a permanent fallback.
//!
//! The prober starts in ICMP mode. The first time the ping facility reports
//! that it cannot run at all, the prober switches to TCP mode for the rest
//! of its lifetime. The flag only ever moves from ICMP to TCP, so concurrent
//! probes racing on it all agree.

use crate::config::Settings;
use crate::error::ScanError;
use crate::scanner::ping::{PingFacility, PingOutcome, SystemPing};
use crate::scanner::tcp;
use crate::scanner::traits::{HostResult, LivenessMethod};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Liveness prober shared by every scan in the process.
pub struct LivenessProber {
    icmp_mode: AtomicBool,
    facility: Arc<dyn PingFacility>,
    fallback_ports: Vec<u16>,
    attempt_timeout: Duration,
}

impl LivenessProber {
    /// Prober backed by the system `ping` command.
    pub fn new(settings: &Settings) -> Self {
        Self::with_facility(settings, Arc::new(SystemPing::new()))
    }

    /// Prober backed by a specific ICMP facility.
    pub fn with_facility(settings: &Settings, facility: Arc<dyn PingFacility>) -> Self {
        Self {
            icmp_mode: AtomicBool::new(settings.icmp_enabled),
            facility,
            fallback_ports: settings.fallback_ports.clone(),
            attempt_timeout: settings.fallback_attempt_timeout(),
        }
    }

    /// Whether liveness checks still go through ICMP.
    pub fn icmp_mode(&self) -> bool {
        self.icmp_mode.load(Ordering::Acquire)
    }

    /// Name of the current technique: `icmp` or `tcp`.
    pub fn mode_name(&self) -> &'static str {
        if self.icmp_mode() {
            "icmp"
        } else {
            "tcp"
        }
    }

    /// Decide whether `address` is reachable, waiting about `timeout_secs`.
    pub async fn probe_host(&self, address: Ipv4Addr, timeout_secs: u64) -> HostResult {
        let start = Instant::now();
        let wait = Duration::from_secs(timeout_secs.max(1));

        if self.icmp_mode() {
            match self.facility.ping(IpAddr::V4(address), wait).await {
                PingOutcome::Ran {
                    reachable: true,
                    rtt,
                } => {
                    let elapsed = rtt.unwrap_or_else(|| start.elapsed());
                    debug!(%address, method = "icmp", "host active");
                    return HostResult::active(address, LivenessMethod::Icmp, elapsed.as_millis() as u64);
                }
                PingOutcome::Ran {
                    reachable: false, ..
                } => {
                    debug!(%address, method = "icmp", "host inactive");
                    return HostResult::inactive(address, LivenessMethod::Icmp);
                }
                PingOutcome::CouldNotRun(reason) => self.disable_icmp(&reason),
            }
        }

        self.probe_tcp(address, wait, start).await
    }

    fn disable_icmp(&self, reason: &str) {
        if self.icmp_mode.swap(false, Ordering::AcqRel) {
            let error = ScanError::FacilityUnavailable(reason.to_string());
            warn!(%error, "switching to TCP connect for liveness checks");
        }
    }

    /// Try the fallback ports one at a time until one accepts a connection.
    ///
    /// The response time counts from `start`, the beginning of the whole
    /// liveness check, so hosts that only answer on a late port report the
    /// time spent on the earlier attempts too.
    async fn probe_tcp(&self, address: Ipv4Addr, wait: Duration, start: Instant) -> HostResult {
        let attempt_timeout = self.attempt_timeout.min(wait);

        for &port in &self.fallback_ports {
            let addr = SocketAddr::new(IpAddr::V4(address), port);
            if tcp::connect(addr, attempt_timeout).await.is_ok() {
                debug!(%address, port, method = "tcp", "host active");
                return HostResult::active(
                    address,
                    LivenessMethod::Tcp(Some(port)),
                    start.elapsed().as_millis() as u64,
                );
            }
        }

        debug!(%address, method = "tcp", "host inactive");
        HostResult::inactive(address, LivenessMethod::Tcp(None))
    }
}
