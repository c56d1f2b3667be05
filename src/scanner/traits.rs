//! Scanner trait abstraction and probe result types.

use crate::types::Port;
use async_trait::async_trait;
use serde::{Serialize, Serializer};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

/// Status of a scanned port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PortStatus {
    /// Port is open (handshake completed).
    Open,
    /// Port is closed (connection actively refused).
    Closed,
    /// Port is filtered (no answer before the timeout, or unreachable).
    Filtered,
}

impl fmt::Display for PortStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Filtered => write!(f, "filtered"),
        }
    }
}

/// Result of probing a single port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortResult {
    /// The port number that was probed.
    pub port: Port,
    /// Status determined by the probe.
    pub status: PortStatus,
    /// Service usually found on this port.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<&'static str>,
    /// Handshake time in milliseconds, only set for open ports.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
}

impl PortResult {
    /// Create a new port result.
    pub fn new(port: Port, status: PortStatus, service: Option<&'static str>) -> Self {
        Self {
            port,
            status,
            service,
            response_time_ms: None,
        }
    }

    /// Set the response time.
    pub fn with_response_time(mut self, time_ms: u64) -> Self {
        self.response_time_ms = Some(time_ms);
        self
    }

    /// Check if the port is open.
    pub fn is_open(&self) -> bool {
        self.status == PortStatus::Open
    }
}

/// Liveness verdict for a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HostStatus {
    Active,
    Inactive,
}

impl fmt::Display for HostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
        }
    }
}

/// Technique that produced a liveness verdict.
///
/// Serialized as `icmp`, `tcp:<port>` (a fallback port answered) or `tcp`
/// (every fallback port failed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivenessMethod {
    Icmp,
    Tcp(Option<u16>),
}

impl fmt::Display for LivenessMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Icmp => write!(f, "icmp"),
            Self::Tcp(Some(port)) => write!(f, "tcp:{}", port),
            Self::Tcp(None) => write!(f, "tcp"),
        }
    }
}

impl Serialize for LivenessMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Result of a liveness probe against one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostResult {
    pub address: Ipv4Addr,
    pub status: HostStatus,
    /// Only set for active hosts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
    pub method: LivenessMethod,
}

impl HostResult {
    /// An active host.
    pub fn active(address: Ipv4Addr, method: LivenessMethod, response_time_ms: u64) -> Self {
        Self {
            address,
            status: HostStatus::Active,
            response_time_ms: Some(response_time_ms),
            method,
        }
    }

    /// An inactive host.
    pub fn inactive(address: Ipv4Addr, method: LivenessMethod) -> Self {
        Self {
            address,
            status: HostStatus::Inactive,
            response_time_ms: None,
            method,
        }
    }

    /// Check if the host answered.
    pub fn is_active(&self) -> bool {
        self.status == HostStatus::Active
    }
}

/// Trait for port scanner implementations.
///
/// A scanner is bound to one target and probes ports against it, so the
/// batch scheduler can fan a port list out through a shared instance.
#[async_trait]
pub trait Scanner: Send + Sync {
    /// Probe a single port. Never fails: errors degrade to a status.
    async fn scan_port(&self, port: Port) -> PortResult;

    /// Get the target IP address.
    fn target(&self) -> IpAddr;

    /// Get the configured timeout.
    fn timeout(&self) -> Duration;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_status_display() {
        assert_eq!(PortStatus::Open.to_string(), "open");
        assert_eq!(PortStatus::Closed.to_string(), "closed");
        assert_eq!(PortStatus::Filtered.to_string(), "filtered");
    }

    #[test]
    fn test_port_result_json() {
        let port = Port::new(80).unwrap();
        let open = PortResult::new(port, PortStatus::Open, Some("http")).with_response_time(15);
        assert!(open.is_open());
        assert_eq!(
            serde_json::to_value(&open).unwrap(),
            serde_json::json!({"port": 80, "status": "open", "service": "http", "responseTimeMs": 15})
        );

        let closed = PortResult::new(Port::new(12345).unwrap(), PortStatus::Closed, None);
        assert_eq!(
            serde_json::to_value(&closed).unwrap(),
            serde_json::json!({"port": 12345, "status": "closed"})
        );
    }

    #[test]
    fn test_liveness_method_display() {
        assert_eq!(LivenessMethod::Icmp.to_string(), "icmp");
        assert_eq!(LivenessMethod::Tcp(Some(443)).to_string(), "tcp:443");
        assert_eq!(LivenessMethod::Tcp(None).to_string(), "tcp");
    }

    #[test]
    fn test_host_result_json() {
        let addr = Ipv4Addr::new(10, 0, 0, 7);
        let active = HostResult::active(addr, LivenessMethod::Tcp(Some(22)), 42);
        assert_eq!(
            serde_json::to_value(&active).unwrap(),
            serde_json::json!({
                "address": "10.0.0.7",
                "status": "active",
                "responseTimeMs": 42,
                "method": "tcp:22"
            })
        );

        let inactive = HostResult::inactive(addr, LivenessMethod::Icmp);
        assert!(!inactive.is_active());
        assert_eq!(
            serde_json::to_value(&inactive).unwrap(),
            serde_json::json!({"address": "10.0.0.7", "status": "inactive", "method": "icmp"})
        );
    }
}
