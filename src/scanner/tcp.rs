//! TCP Connect probing.
//!
//! Performs full TCP handshakes using the operating system's socket API.
//! No elevated privileges are needed. The connect future is wrapped in
//! `tokio::time::timeout`, so an expired attempt is dropped together with
//! its half-open socket, and an established stream is dropped before the
//! probe returns.

use crate::error::{ScanError, ScanResult};
use crate::scanner::traits::{PortResult, PortStatus, Scanner};
use crate::services::service_name;
use crate::types::Port;
use async_trait::async_trait;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

/// TCP Connect Scanner bound to a single target.
#[derive(Debug, Clone)]
pub struct TcpConnectScanner {
    target: IpAddr,
    timeout: Duration,
}

impl TcpConnectScanner {
    /// Create a new TCP connect scanner.
    ///
    /// # Arguments
    /// * `target` - Target IP address to scan
    /// * `timeout` - Connection timeout per port
    pub fn new(target: IpAddr, timeout: Duration) -> Self {
        Self { target, timeout }
    }
}

#[async_trait]
impl Scanner for TcpConnectScanner {
    fn target(&self) -> IpAddr {
        self.target
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn scan_port(&self, port: Port) -> PortResult {
        let addr = SocketAddr::new(self.target, port.as_u16());
        let service = service_name(port.as_u16());

        let result = match connect(addr, self.timeout).await {
            Ok(elapsed) => PortResult::new(port, PortStatus::Open, service)
                .with_response_time(elapsed.as_millis() as u64),
            Err(e) => PortResult::new(port, status_for(&e), service),
        };

        debug!(%addr, status = %result.status, "port probed");
        result
    }
}

/// Probe one `host:port` with a bounded connect.
pub async fn probe(host: IpAddr, port: Port, connect_timeout: Duration) -> PortResult {
    TcpConnectScanner::new(host, connect_timeout)
        .scan_port(port)
        .await
}

/// Complete a TCP handshake with `addr` within `connect_timeout`.
///
/// Returns the handshake time. The stream is closed before returning.
pub async fn connect(addr: SocketAddr, connect_timeout: Duration) -> ScanResult<Duration> {
    let start = Instant::now();
    match timeout(connect_timeout, TcpStream::connect(addr)).await {
        Ok(Ok(stream)) => {
            let elapsed = start.elapsed();
            drop(stream);
            Ok(elapsed)
        }
        Ok(Err(e)) => Err(classify(e)),
        Err(_) => Err(ScanError::Timeout),
    }
}

fn classify(e: io::Error) -> ScanError {
    match e.kind() {
        io::ErrorKind::ConnectionRefused | io::ErrorKind::ConnectionReset => {
            ScanError::ConnectionRefused
        }
        io::ErrorKind::TimedOut => ScanError::Timeout,
        io::ErrorKind::HostUnreachable | io::ErrorKind::NetworkUnreachable => {
            ScanError::Unreachable(e.to_string())
        }
        _ => {
            // Platforms that don't map the errno to a kind still say so in the message.
            let message = e.to_string();
            let lowered = message.to_lowercase();
            if lowered.contains("unreachable") || lowered.contains("no route to host") {
                ScanError::Unreachable(message)
            } else {
                ScanError::ConnectionFailed(message)
            }
        }
    }
}

fn status_for(error: &ScanError) -> PortStatus {
    match error {
        ScanError::ConnectionRefused => PortStatus::Closed,
        ScanError::Timeout | ScanError::Unreachable(_) => PortStatus::Filtered,
        ScanError::ConnectionFailed(_) | ScanError::FacilityUnavailable(_) => PortStatus::Closed,
    }
}
