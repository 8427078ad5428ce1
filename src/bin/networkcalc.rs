//! NetworkCalc ETL connector
//!
//! Pulls subnet, binary conversion or certificate data from NetworkCalc and
//! stores each response. Any failure stops the run with exit code 1.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use intel_etl::{cli, error::Result, models::Config, pipeline::EtlSummary, services::Mode};

/// NetworkCalc ETL Connector
#[derive(Parser, Debug)]
#[command(name = "networkcalc-etl", version, about = "NetworkCalc ETL Connector")]
struct Cli {
    /// ip, binary, certificate or all
    #[arg(long, value_parser = parse_mode)]
    mode: Mode,

    /// Subnet, number or hostname, depending on mode
    #[arg(long)]
    input: Option<String>,

    /// Optional TOML config file; environment variables override it
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_mode(value: &str) -> std::result::Result<Mode, String> {
    value.parse().map_err(|e: intel_etl::error::AppError| e.to_string())
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
    cli::run_networkcalc_etl(args.mode, args.input.as_deref(), &config).await
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args = Cli::parse();
    init_logging(args.verbose);

    log::info!("NetworkCalc ETL starting ({:?})", args.mode);
    ExitCode::from(cli::exit_code(&run(&args).await))
}
