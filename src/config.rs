use chrono::NaiveDate;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Server settings, read from flags with environment fallbacks.
#[derive(Debug, Clone, Parser)]
#[command(name = "website", about = "Serve the interactive sales grid demo")]
pub struct AppConfig {
    /// Interface to bind
    #[arg(long, env = "SALESGRID_HOST", default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, env = "SALESGRID_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Rows generated when a request does not ask for a size
    #[arg(long, env = "SALESGRID_DEFAULT_ROWS", default_value_t = 500)]
    pub default_rows: i64,

    /// Largest dataset a single request may ask for
    #[arg(long, env = "SALESGRID_MAX_ROWS", default_value_t = 10_000)]
    pub max_rows: i64,

    /// Seed used when a request does not pass one; keeps reloads stable
    #[arg(long, env = "SALESGRID_SEED", default_value_t = 42)]
    pub seed: u64,

    /// Directory served under /static
    #[arg(long, env = "SALESGRID_STATIC_DIR", default_value = "static")]
    pub static_dir: PathBuf,

    /// Pin the last day of generated data (YYYY-MM-DD); unset means today, per request
    #[arg(long, env = "SALESGRID_ANCHOR_DATE")]
    pub anchor_date: Option<NaiveDate>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            default_rows: 500,
            max_rows: 10_000,
            seed: 42,
            static_dir: PathBuf::from("static"),
            anchor_date: None,
        }
    }
}

impl AppConfig {
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}
