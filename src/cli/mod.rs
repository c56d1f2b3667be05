//! CLI subcommand definitions and handlers.
//!
//! Implements a git-like subcommand architecture:
//! - `rangescan hosts <target>` - Sweep a target for live hosts
//! - `rangescan ports <ip>` - Probe a port set on one host
//! - `rangescan serve` - Run the JSON endpoints

mod hosts;
mod ports;
mod serve;

pub use hosts::HostsCommand;
pub use ports::PortsCommand;
pub use serve::ServeCommand;

use crate::config::Settings;
use crate::error::CliResult;
use crate::output;
use crate::scanner::StopSignal;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::debug;

/// rangescan - host discovery and port probing for small IPv4 ranges.
///
/// Sweeps single addresses, dash ranges and CIDR blocks down to /24 for live
/// hosts (ICMP first, TCP connect when ping is unavailable) and probes preset
/// or custom port sets on a single host.
#[derive(Parser, Debug)]
#[command(name = "rangescan")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Host discovery and port probing for small IPv4 ranges", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output (debug logs and a progress bar)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to a custom settings file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Load settings from `--config` or the default location.
    pub fn load_settings(&self) -> CliResult<Settings> {
        let settings = match &self.config {
            Some(path) => Settings::load_from(path)?,
            None => Settings::load()?,
        };
        Ok(settings)
    }

    /// Run the selected subcommand.
    pub async fn execute(&self, settings: Settings) -> CliResult<()> {
        match &self.command {
            Commands::Hosts(cmd) => cmd.execute(settings, self.verbose, self.quiet).await,
            Commands::Ports(cmd) => cmd.execute(settings, self.verbose, self.quiet).await,
            Commands::Serve(cmd) => cmd.execute(settings, self.quiet).await,
        }
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Find live hosts in an address, range or CIDR block
    #[command(alias = "h")]
    Hosts(HostsCommand),

    /// Probe a set of TCP ports on one host
    #[command(alias = "p")]
    Ports(PortsCommand),

    /// Serve the scan-hosts and scan-ports endpoints
    Serve(ServeCommand),
}

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable plain text
    #[default]
    Plain,
    /// JSON, identical to the HTTP response body
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Stop signal that fires on the first Ctrl-C.
fn stop_on_ctrl_c() -> StopSignal {
    let stop = StopSignal::new();
    let handle = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("interrupt received");
            output::print_warning("interrupted, finishing the current batch");
            handle.stop();
        }
    });
    stop
}

/// Progress bar shown in verbose mode.
fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
    {
        pb.set_style(style.progress_chars("=>-"));
    }
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::net::SocketAddr;
    use std::time::Duration;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_hosts() {
        let cli = Cli::try_parse_from([
            "rangescan", "hosts", "10.0.0.0/24", "--timeout", "500", "--batch-size", "20", "-o", "json",
        ])
        .unwrap();

        match cli.command {
            Commands::Hosts(cmd) => {
                assert_eq!(cmd.target, "10.0.0.0/24");
                assert_eq!(cmd.timeout, Some(500));
                assert_eq!(cmd.batch_size, Some(20));
                assert_eq!(cmd.output, OutputFormat::Json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_ports_and_globals() {
        let cli = Cli::try_parse_from([
            "rangescan", "-v", "ports", "127.0.0.1", "--preset", "extended", "--config", "/tmp/s.json",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/s.json")));
        match cli.command {
            Commands::Ports(cmd) => {
                assert_eq!(cmd.ip, "127.0.0.1");
                assert_eq!(cmd.preset, Some(crate::types::PortPreset::All));
                assert_eq!(cmd.output, OutputFormat::Plain);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["rangescan", "serve", "--listen", "0.0.0.0:9000"]).unwrap();
        match cli.command {
            Commands::Serve(cmd) => {
                assert_eq!(cmd.listen, Some("0.0.0.0:9000".parse::<SocketAddr>().unwrap()));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["rangescan", "-v", "-q", "hosts", "10.0.0.1"]).is_err());
    }

    #[test]
    fn test_load_settings_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"host_batch_size": 25}"#).unwrap();

        let cli = Cli::try_parse_from([
            "rangescan",
            "--config",
            path.to_str().unwrap(),
            "hosts",
            "10.0.0.1",
        ])
        .unwrap();
        let settings = cli.load_settings().unwrap();
        assert_eq!(settings.host_batch_size, 25);
        assert_eq!(settings.port_timeout_ms, Duration::from_secs(3).as_millis() as u64);
    }
}
