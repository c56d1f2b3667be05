//! Output formatting module.
//!
//! Provides formatters for plain text and JSON output of scan reports. JSON
//! output is exactly the body the HTTP endpoints return.

mod json_format;
mod plain;

pub use json_format::print_json;
pub use plain::{print_error, print_info, print_scan_header, print_warning};

use crate::cli::OutputFormat;
use crate::scanner::{HostScanReport, PortScanReport};
use std::io;

/// Print a host scan report in the requested format.
pub fn print_host_report(report: &HostScanReport, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Plain => plain::write_hosts(&mut io::stdout().lock(), report),
        OutputFormat::Json => print_json(report),
    }
}

/// Print a port scan report in the requested format.
pub fn print_port_report(report: &PortScanReport, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Plain => plain::write_ports(&mut io::stdout().lock(), report),
        OutputFormat::Json => print_json(report),
    }
}
