#![cfg(not(tarpaulin_include))]

use clap::Parser;
use salesgrid::app;
use salesgrid::config::AppConfig;

/// Main entry point for the web application
///
/// Reads the server settings from flags and `SALESGRID_*` variables, then serves the
/// sales grid page and its API until the process is stopped.
///
/// # Returns
/// * `Result<(), Box<dyn std::error::Error>>` - Success or error object
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::parse();
    log::info!(
        "Starting web server (default {} rows, seed {})",
        config.default_rows,
        config.seed
    );

    app::run(config).await
}
