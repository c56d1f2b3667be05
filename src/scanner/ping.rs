//! ICMP reachability through the system `ping` utility.
//!
//! Raw ICMP sockets need privileges, so the echo request is delegated to the
//! OS `ping` binary. The facility reports whether it actually ran: a missing
//! binary or a ping that lacks socket permission is not a verdict about the
//! target, and the liveness prober reacts to it by switching to TCP.

use async_trait::async_trait;
use std::net::IpAddr;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// Outcome of one ping invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum PingOutcome {
    /// The facility ran and produced a verdict.
    Ran {
        reachable: bool,
        /// Round-trip time reported by the facility, if any.
        rtt: Option<Duration>,
    },
    /// The facility could not be used at all.
    CouldNotRun(String),
}

/// An ICMP echo facility.
#[async_trait]
pub trait PingFacility: Send + Sync {
    /// Send one echo request to `addr`, waiting at most `wait` for a reply.
    async fn ping(&self, addr: IpAddr, wait: Duration) -> PingOutcome;
}

/// Runs the operating system's `ping` command.
#[derive(Debug, Clone)]
pub struct SystemPing {
    program: String,
}

impl SystemPing {
    /// Use `ping` from `PATH`.
    pub fn new() -> Self {
        Self::with_program("ping")
    }

    /// Use a specific ping executable.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for SystemPing {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PingFacility for SystemPing {
    async fn ping(&self, addr: IpAddr, wait: Duration) -> PingOutcome {
        let mut command = Command::new(&self.program);
        command
            .args(ping_args(addr, wait))
            .stdin(Stdio::null())
            .kill_on_drop(true);

        // Grace second on top of ping's own deadline; the child is killed on expiry.
        let output = match timeout(wait + Duration::from_secs(1), command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return PingOutcome::CouldNotRun(format!("{}: {}", self.program, e)),
            Err(_) => {
                return PingOutcome::Ran {
                    reachable: false,
                    rtt: None,
                }
            }
        };

        if output.status.success() {
            return PingOutcome::Ran {
                reachable: true,
                rtt: parse_rtt(&String::from_utf8_lossy(&output.stdout)),
            };
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if lacks_privilege(&stderr) {
            PingOutcome::CouldNotRun(stderr.trim().to_string())
        } else {
            PingOutcome::Ran {
                reachable: false,
                rtt: None,
            }
        }
    }
}

/// Whole seconds to wait, rounded up, never zero.
fn wait_secs(wait: Duration) -> u64 {
    wait.as_millis().div_ceil(1000).max(1) as u64
}

#[cfg(target_os = "windows")]
fn ping_args(addr: IpAddr, wait: Duration) -> Vec<String> {
    vec![
        "-n".to_string(),
        "1".to_string(),
        "-w".to_string(),
        (wait_secs(wait) * 1000).to_string(),
        addr.to_string(),
    ]
}

#[cfg(target_os = "macos")]
fn ping_args(addr: IpAddr, wait: Duration) -> Vec<String> {
    vec![
        "-c".to_string(),
        "1".to_string(),
        "-t".to_string(),
        wait_secs(wait).to_string(),
        addr.to_string(),
    ]
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn ping_args(addr: IpAddr, wait: Duration) -> Vec<String> {
    vec![
        "-c".to_string(),
        "1".to_string(),
        "-W".to_string(),
        wait_secs(wait).to_string(),
        addr.to_string(),
    ]
}

/// Extract `time=12.3 ms` from ping output.
fn parse_rtt(stdout: &str) -> Option<Duration> {
    let start = stdout.find("time=")? + "time=".len();
    let number: String = stdout[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let millis: f64 = number.parse().ok()?;
    Some(Duration::from_micros((millis * 1000.0).round() as u64))
}

fn lacks_privilege(stderr: &str) -> bool {
    let stderr = stderr.to_lowercase();
    ["operation not permitted", "permission denied", "are you root"]
        .iter()
        .any(|needle| stderr.contains(needle))
}
