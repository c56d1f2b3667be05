//! Plain text output formatting.
//!
//! Produces human-readable tables with colors and formatting.

use crate::scanner::{HostScanReport, HostStatus, PortScanReport, PortStatus};
use console::{style, Style};
use std::io::{self, Write};

const RULE: &str = "═══════════════════════════════════════════════════════════════";
const THIN_RULE: &str = "───────────────────────────────────────────────────────────────";

/// Write a host scan report as a table.
pub fn write_hosts<W: Write>(out: &mut W, report: &HostScanReport) -> io::Result<()> {
    write_banner(out, "Host Discovery")?;

    writeln!(out, "  {} {}", style("Target:").bold(), report.target)?;
    writeln!(out, "  {} {}", style("Method:").bold(), report.method)?;
    writeln!(out, "  {} {}", style("Scan ID:").bold(), style(report.scan_id.short()).dim())?;
    writeln!(out)?;
    let summary = report.summary();
    writeln!(
        out,
        "  {} {} hosts probed in {:.2}s, {} active",
        style("Statistics:").bold(),
        summary.total,
        summary.duration_ms as f64 / 1000.0,
        style(summary.active_or_open).green().bold()
    )?;
    writeln!(out)?;

    if report.results.is_empty() {
        writeln!(out, "  {}", style("No hosts to display.").dim())?;
    } else {
        writeln!(out, "  {}", style(THIN_RULE).dim())?;
        writeln!(
            out,
            "  {:<16}  {:^10}  {:>8}  {}",
            style("ADDRESS").bold(),
            style("STATE").bold(),
            style("RTT").bold(),
            style("METHOD").bold()
        )?;
        writeln!(out, "  {}", style(THIN_RULE).dim())?;

        for result in &report.results {
            let status_style = match result.status {
                HostStatus::Active => Style::new().green().bold(),
                HostStatus::Inactive => Style::new().red(),
            };
            writeln!(
                out,
                "  {:<16}  {:^10}  {:>8}  {}",
                result.address,
                status_style.apply_to(result.status.to_string()),
                format_rtt(result.response_time_ms),
                style(result.method.to_string()).dim()
            )?;
        }

        writeln!(out, "  {}", style(THIN_RULE).dim())?;
    }

    write_footer(out)
}

/// Write a port scan report as a table.
pub fn write_ports<W: Write>(out: &mut W, report: &PortScanReport) -> io::Result<()> {
    write_banner(out, "Port Scan")?;

    writeln!(out, "  {} {}", style("IP Address:").bold(), report.ip)?;
    writeln!(out, "  {} {}", style("Scan ID:").bold(), style(report.scan_id.short()).dim())?;
    writeln!(out)?;
    let summary = report.summary();
    writeln!(
        out,
        "  {} {} ports scanned in {:.2}s",
        style("Statistics:").bold(),
        summary.total,
        summary.duration_ms as f64 / 1000.0
    )?;
    writeln!(
        out,
        "               {} open, {} closed, {} filtered",
        style(summary.active_or_open).green().bold(),
        style(summary.inactive_or_closed - report.filtered_count).red(),
        style(report.filtered_count).yellow()
    )?;
    writeln!(out)?;

    if report.ports.is_empty() {
        writeln!(out, "  {}", style("No ports to display.").dim())?;
    } else {
        writeln!(out, "  {}", style(THIN_RULE).dim())?;
        writeln!(
            out,
            "  {:>6}  {:^10}  {:<15}  {:>8}",
            style("PORT").bold(),
            style("STATE").bold(),
            style("SERVICE").bold(),
            style("RTT").bold()
        )?;
        writeln!(out, "  {}", style(THIN_RULE).dim())?;

        for result in &report.ports {
            let status_style = match result.status {
                PortStatus::Open => Style::new().green().bold(),
                PortStatus::Closed => Style::new().red(),
                PortStatus::Filtered => Style::new().yellow(),
            };
            writeln!(
                out,
                "  {:>6}  {:^10}  {:<15}  {:>8}",
                result.port,
                status_style.apply_to(result.status.to_string()),
                result.service.unwrap_or("unknown"),
                format_rtt(result.response_time_ms)
            )?;
        }

        writeln!(out, "  {}", style(THIN_RULE).dim())?;
    }

    write_footer(out)
}

fn write_banner<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out, "                    {} {}", style("rangescan").cyan().bold(), title)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)
}

fn write_footer<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)
}

fn format_rtt(ms: Option<u64>) -> String {
    ms.map(|ms| format!("{ms}ms")).unwrap_or_else(|| "-".to_string())
}

/// Print a scan header before scanning begins.
pub fn print_scan_header(kind: &str, target: &str, count: usize) {
    eprintln!();
    eprintln!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("rangescan").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    eprintln!("{} Scan: {}", style("•").dim(), style(kind).yellow());
    eprintln!("{} Target: {}", style("•").dim(), style(target).white().bold());
    eprintln!("{} Probing {} items...", style("•").dim(), style(count).white().bold());
    eprintln!();
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Print an info message.
pub fn print_info(msg: &str) {
    eprintln!("{} {}", style("ℹ").blue().bold(), msg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{HostResult, LivenessMethod, PortResult};
    use crate::types::{Port, ScanId};
    use chrono::Utc;
    use std::net::Ipv4Addr;

    fn render<F: FnOnce(&mut Vec<u8>) -> io::Result<()>>(f: F) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        console::strip_ansi_codes(&String::from_utf8(buf).unwrap()).into_owned()
    }

    #[test]
    fn test_host_table() {
        let report = HostScanReport {
            success: true,
            scan_id: ScanId::new(),
            target: "10.0.0.1-10.0.0.2".to_string(),
            method: "tcp",
            total_hosts: 2,
            active_hosts: 1,
            scan_duration: 1500,
            timestamp: Utc::now(),
            results: vec![
                HostResult::active(Ipv4Addr::new(10, 0, 0, 1), LivenessMethod::Tcp(Some(22)), 12),
                HostResult::inactive(Ipv4Addr::new(10, 0, 0, 2), LivenessMethod::Tcp(None)),
            ],
        };

        let text = render(|out| write_hosts(out, &report));
        assert!(text.contains("Host Discovery"));
        assert!(text.contains("2 hosts probed in 1.50s, 1 active"));
        assert!(text.contains("10.0.0.1"));
        assert!(text.contains("12ms"));
        assert!(text.contains("tcp:22"));
        assert!(text.contains("inactive"));
    }

    #[test]
    fn test_port_table() {
        let port = |p| Port::new(p).unwrap();
        let report = PortScanReport {
            scan_id: ScanId::new(),
            ip: Ipv4Addr::LOCALHOST,
            ports: vec![
                PortResult::new(port(22), PortStatus::Open, Some("ssh")).with_response_time(3),
                PortResult::new(port(81), PortStatus::Filtered, None),
            ],
            scan_time: 250,
            open_count: 1,
            closed_count: 1,
            filtered_count: 1,
            timestamp: Utc::now(),
        };

        let text = render(|out| write_ports(out, &report));
        assert!(text.contains("2 ports scanned in 0.25s"));
        assert!(text.contains("1 open, 0 closed, 1 filtered"));
        assert!(text.contains("ssh"));
        assert!(text.contains("unknown"));
    }

    #[test]
    fn test_format_rtt() {
        assert_eq!(format_rtt(Some(7)), "7ms");
        assert_eq!(format_rtt(None), "-");
    }
}
