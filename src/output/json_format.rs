//! JSON output formatting.

use serde::Serialize;
use std::io;

/// Print any report as pretty JSON on stdout.
pub fn print_json<T: Serialize>(report: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(report).map_err(io::Error::other)?;
    println!("{json}");
    Ok(())
}
