//! OTX IPv4 General ETL connector
//!
//! Fetches the OTX `general` section for each IP and stores one document per
//! successful fetch. Failing IPs are logged and skipped.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use intel_etl::{cli, error::Result, models::Config, pipeline::EtlSummary};

/// OTX IPv4 General ETL Connector
#[derive(Parser, Debug)]
#[command(name = "otx-etl", version, about = "OTX IPv4 General ETL Connector")]
struct Cli {
    /// Comma-separated IPv4 list
    #[arg(long)]
    ips: String,

    /// Optional TOML config file; environment variables override it
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

async fn run(args: &Cli) -> Result<EtlSummary> {
    let config = Config::resolve(&args.config)?;
    cli::run_otx_etl(&args.ips, &config).await
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args = Cli::parse();
    init_logging(args.verbose);

    ExitCode::from(cli::exit_code(&run(&args).await))
}
