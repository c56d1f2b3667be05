//! Hosts subcommand implementation.
//!
//! Handles the `rangescan hosts <target>` command for host discovery.

use super::{progress_bar, stop_on_ctrl_c, OutputFormat};
use crate::api::{HostScanRequest, ScanHooks, ScanService};
use crate::config::Settings;
use crate::error::{CliResult, RequestError};
use crate::output;
use crate::types::TargetSpec;
use clap::Parser;

/// Find live hosts in a target.
#[derive(Parser, Debug)]
pub struct HostsCommand {
    /// Target to sweep
    ///
    /// Examples:
    ///   192.168.1.10                 Single address
    ///   192.168.1.10-192.168.1.40    Dash range (at most 255 addresses)
    ///   192.168.1.10-40              Last-octet shorthand
    ///   192.168.1.0/24               CIDR block (/24 to /32)
    #[arg(value_name = "TARGET")]
    pub target: String,

    /// Per-host timeout in milliseconds
    #[arg(short = 't', long)]
    pub timeout: Option<u64>,

    /// Number of hosts probed concurrently
    #[arg(short = 'b', long)]
    pub batch_size: Option<usize>,

    /// Output format for results
    #[arg(short, long, value_enum, default_value = "plain")]
    pub output: OutputFormat,
}

impl HostsCommand {
    /// Execute the hosts command.
    pub async fn execute(&self, settings: Settings, verbose: bool, quiet: bool) -> CliResult<()> {
        let target = TargetSpec::parse(&self.target).map_err(RequestError::from)?;

        if !quiet && self.output == OutputFormat::Plain {
            output::print_scan_header("host discovery", &target.to_string(), target.host_count());
        }

        let request = HostScanRequest {
            target: Some(self.target.clone()),
            timeout: self.timeout,
            batch_size: self.batch_size,
            ..Default::default()
        };
        let stop = stop_on_ctrl_c();
        let progress = verbose.then(|| progress_bar(target.host_count()));
        let hooks = ScanHooks {
            stop: Some(stop.clone()),
            progress: progress.clone(),
        };

        let service = ScanService::new(settings);
        let report = service.scan_hosts_with(&request, hooks).await?;

        if let Some(pb) = progress {
            pb.finish_with_message("Scan complete");
        }
        if stop.is_stopped() && !quiet {
            output::print_warning(&format!(
                "scan interrupted: {} of {} hosts probed",
                report.total_hosts,
                target.host_count()
            ));
        }

        output::print_host_report(&report, self.output)?;
        Ok(())
    }
}
