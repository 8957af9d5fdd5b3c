//! Portfolio API Server binary

use clap::Parser;
use portfolio_consolidator::api::{run_api_server, ApiConfig};
use portfolio_consolidator::config::{parse_reporting_date, EngineConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "portfolio-server")]
#[command(version)]
#[command(about = "Portfolio API Server - consolidate uploaded portfolio disclosures over HTTP")]
#[command(long_about = r#"
Portfolio API Server

Endpoints:
  - POST /api/v1/consolidate  - Workbook bytes in, consolidated holdings out
                                (?format=csv for a CSV download)
  - GET  /health              - Health check
  - GET  /version             - Server version and batch constants
  - GET  /                    - API documentation

Repeated uploads of the same workbook are served from a content-hash cache.

Example usage:
  portfolio-server --amc "Axis Mutual Fund" --date 2025-12-31

  curl -X POST http://localhost:8080/api/v1/consolidate \
    --data-binary @"Monthly Portfolio-31 12 25.xlsx"
"#)]
struct Args {
    /// Host address to bind to (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, default_value = "127.0.0.1", env = "PORTFOLIO_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "PORTFOLIO_PORT")]
    port: u16,

    /// YAML engine configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fund house name stamped on every record
    #[arg(long, env = "PORTFOLIO_AMC")]
    amc: Option<String>,

    /// Reporting date (YYYY-MM-DD)
    #[arg(long, env = "PORTFOLIO_DATE")]
    date: Option<String>,

    /// Number of distinct uploads to keep cached
    #[arg(long, default_value = "32")]
    cache_capacity: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut engine = match &args.config {
        Some(path) => EngineConfig::from_path(path)?,
        None => EngineConfig::default(),
    };
    if let Some(amc) = args.amc {
        engine = engine.with_amc_name(amc);
    }
    if let Some(date) = args.date {
        engine = engine.with_reporting_date(parse_reporting_date(&date)?);
    }

    let config = ApiConfig {
        host: args.host,
        port: args.port,
        cache_capacity: args.cache_capacity,
        engine,
        ..Default::default()
    };

    run_api_server(config).await
}
