//! Serve subcommand implementation.

use crate::api::ScanService;
use crate::config::Settings;
use crate::error::CliResult;
use crate::output;
use crate::server;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

/// Serve the JSON scan endpoints.
#[derive(Parser, Debug)]
pub struct ServeCommand {
    /// Address to listen on (default from settings, 127.0.0.1:8787)
    #[arg(short, long, env = "RANGESCAN_LISTEN", value_name = "ADDR")]
    pub listen: Option<SocketAddr>,
}

impl ServeCommand {
    /// Execute the serve command. Runs until Ctrl-C.
    pub async fn execute(&self, settings: Settings, quiet: bool) -> CliResult<()> {
        let addr = self.listen.unwrap_or(settings.listen_addr);
        let service = Arc::new(ScanService::new(settings));

        if !quiet {
            output::print_info(&format!("Serving scan-hosts and scan-ports on http://{addr}"));
        }
        server::serve(service, addr, shutdown_signal()).await
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "could not listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
