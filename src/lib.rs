//! # rangescan - Host Discovery and Port Probing for Small IPv4 Ranges
//!
//! rangescan sweeps small IPv4 ranges for live hosts and probes TCP port
//! sets on individual hosts. Results are available from a CLI and from two
//! JSON endpoints.
//!
//! ## Features
//!
//! - **Flexible Targeting**: Single addresses, dash ranges and CIDR blocks from /24 to /32
//! - **Liveness Fallback**: ICMP echo via the system `ping`, switching permanently to
//!   TCP connect probes when ping cannot run
//! - **Port Presets**: `common`, `web`, `database`, `all` and custom lists
//! - **Batched Concurrency**: Fixed-size batches with a barrier between them
//! - **JSON Endpoints**: `scan-hosts` and `scan-ports` with permissive CORS
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use rangescan::api::{PortScanRequest, ScanService};
//! use rangescan::config::Settings;
//!
//! #[tokio::main]
//! async fn main() {
//!     let service = ScanService::new(Settings::default());
//!     let request = PortScanRequest {
//!         ip: Some("192.168.1.1".to_string()),
//!         preset: Some("web".to_string()),
//!         ..Default::default()
//!     };
//!
//!     let report = service.scan_ports(&request).await.unwrap();
//!     println!("{} open ports", report.open_count);
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Targets, ports and scan identifiers
//! - [`scanner`] - Probes, the liveness prober and the batch scheduler
//! - [`api`] - Request validation shared by the CLI and the server
//! - [`server`] - warp routes for the JSON endpoints
//! - [`config`] - Settings file handling
//! - [`error`] - Error types
//! - [`output`] - Output formatting utilities

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod scanner;
pub mod server;
pub mod services;
pub mod types;

// Re-export commonly used types
pub use api::{HostScanRequest, PortScanRequest, ScanService};
pub use error::{CliError, RequestError, ScanError};
pub use scanner::{HostResult, LivenessProber, PortResult, PortStatus, Scanner};
pub use types::{expand, Port, PortList, PortPreset, ScanId, TargetSpec};
