// src/cli.rs

//! Run entry points behind the `otx-etl` and `networkcalc-etl` binaries.
//!
//! The binaries only parse arguments, resolve the config and map the
//! returned `Result` to an exit code with [`exit_code`].

use crate::error::Result;
use crate::models::Config;
use crate::pipeline::{self, EtlSummary};
use crate::services::{Mode, NetworkCalcClient, OtxClient};
use crate::storage;
use crate::utils::http::ApiClient;

/// Exit status for a successful run.
pub const EXIT_SUCCESS: u8 = 0;

/// Exit status for a failed run.
pub const EXIT_FAILURE: u8 = 1;

/// Run the OTX connector for a comma-separated IP list.
///
/// An argument with no usable IPs is logged and ends the run without
/// touching the API or the store.
pub async fn run_otx_etl(ips_arg: &str, config: &Config) -> Result<EtlSummary> {
    let ips = pipeline::parse_ip_list(ips_arg);
    if ips.is_empty() {
        log::error!("No valid IPs provided.");
        return Ok(EtlSummary::default());
    }

    config.validate_otx()?;

    let api = ApiClient::new(&config.http)?;
    let client = OtxClient::new(api, &config.otx)?;
    let store = storage::open(&config.store).await?;

    let summary = pipeline::run_otx(&client, store.as_ref(), &ips).await?;
    log::info!(
        "Attempted {} of {} IPs, inserted {}",
        summary.attempted,
        summary.requested,
        summary.inserted
    );
    Ok(summary)
}

/// Run the NetworkCalc connector.
///
/// Config and inputs are checked before any connection is opened.
pub async fn run_networkcalc_etl(
    mode: Mode,
    input: Option<&str>,
    config: &Config,
) -> Result<EtlSummary> {
    config.validate_networkcalc()?;
    pipeline::plan_requests(mode, input, &config.networkcalc.samples)?;

    let api = ApiClient::new(&config.http)?;
    let client = NetworkCalcClient::new(api, &config.networkcalc)?;
    let store = storage::open(&config.store).await?;

    pipeline::run_networkcalc(
        &client,
        store.as_ref(),
        mode,
        input,
        &config.networkcalc.samples,
    )
    .await
}

/// Log a failed run and map it to the process exit status.
pub fn exit_code<T>(result: &Result<T>) -> u8 {
    match result {
        Ok(_) => EXIT_SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            EXIT_FAILURE
        }
    }
}
