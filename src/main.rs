use anyhow::{Context, Result};
use clap::Parser;
use rangescan::cli::Cli;
use rangescan::output;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON on stdout stays parseable.
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    let settings = cli.load_settings().context("failed to load settings")?;

    if let Err(e) = cli.execute(settings).await {
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
    Ok(())
}
