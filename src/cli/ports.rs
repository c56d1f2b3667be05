//! Ports subcommand implementation.
//!
//! Handles the `rangescan ports <ip>` command for TCP port probing.

use super::{progress_bar, stop_on_ctrl_c, OutputFormat};
use crate::api::{PortScanRequest, ScanHooks, ScanService};
use crate::config::Settings;
use crate::error::{CliResult, RequestError};
use crate::output;
use crate::types::{PortList, PortPreset};
use clap::Parser;

/// Probe a set of TCP ports on one host.
#[derive(Parser, Debug)]
pub struct PortsCommand {
    /// IPv4 address to probe
    #[arg(value_name = "IP")]
    pub ip: String,

    /// Port preset to use (default: common, or custom when --ports is given)
    #[arg(short = 'P', long, value_enum)]
    pub preset: Option<PortPreset>,

    /// Custom ports (e.g., "22", "22,80,443", "8000-8010")
    #[arg(short, long)]
    pub ports: Option<String>,

    /// Connection timeout in milliseconds
    #[arg(short = 't', long)]
    pub timeout: Option<u64>,

    /// Output format for results
    #[arg(short, long, value_enum, default_value = "plain")]
    pub output: OutputFormat,
}

impl PortsCommand {
    /// Preset in effect: an explicit `--preset`, else `custom` when `--ports` is given.
    fn effective_preset(&self) -> PortPreset {
        match (self.preset, &self.ports) {
            (Some(preset), _) => preset,
            (None, Some(_)) => PortPreset::Custom,
            (None, None) => PortPreset::Common,
        }
    }

    fn request(&self) -> PortScanRequest {
        PortScanRequest {
            ip: Some(self.ip.clone()),
            preset: Some(self.effective_preset().to_string()),
            ports: self.ports.clone(),
            timeout: self.timeout,
        }
    }

    /// Execute the ports command.
    pub async fn execute(&self, settings: Settings, verbose: bool, quiet: bool) -> CliResult<()> {
        let request = self.request();
        let ports = PortList::resolve(request.preset.as_deref(), request.ports.as_deref())
            .map_err(RequestError::from)?;

        if !quiet && self.output == OutputFormat::Plain {
            let kind = format!("ports ({})", self.effective_preset());
            output::print_scan_header(&kind, &self.ip, ports.len());
        }

        let stop = stop_on_ctrl_c();
        let progress = verbose.then(|| progress_bar(ports.len()));
        let hooks = ScanHooks {
            stop: Some(stop.clone()),
            progress: progress.clone(),
        };

        let service = ScanService::new(settings);
        let report = service.scan_ports_with(&request, hooks).await?;

        if let Some(pb) = progress {
            pb.finish_with_message("Scan complete");
        }
        if stop.is_stopped() && !quiet {
            output::print_warning(&format!(
                "scan interrupted: {} ports probed",
                report.ports.len()
            ));
        }

        output::print_port_report(&report, self.output)?;
        Ok(())
    }
}
