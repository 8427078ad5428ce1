// src/pipeline/networkcalc.rs

//! NetworkCalc pipeline.

use crate::error::{AppError, Result};
use crate::models::{IngestedRecord, SampleInputs};
use crate::services::{Endpoint, Mode, NetworkCalcClient};
use crate::storage::RecordStore;

use super::EtlSummary;

/// Resolve which endpoint gets which input.
///
/// Single modes need `input`. `all` takes each endpoint's configured sample,
/// since no one value is an address, a number and a hostname at once. Every
/// input is validated here so a bad value fails before any request goes out.
pub fn plan_requests(
    mode: Mode,
    input: Option<&str>,
    samples: &SampleInputs,
) -> Result<Vec<(Endpoint, String)>> {
    let input = input.map(str::trim).filter(|i| !i.is_empty());

    let plan: Vec<(Endpoint, String)> = match (mode, input) {
        (Mode::Single(_), Some(input)) => mode
            .endpoints()
            .into_iter()
            .map(|endpoint| (endpoint, input.to_string()))
            .collect(),
        (Mode::Single(endpoint), None) => {
            return Err(AppError::validation(format!(
                "--input is required for mode {endpoint}"
            )));
        }
        (Mode::All, Some(_)) => {
            return Err(AppError::validation(
                "--input cannot be combined with --mode all; set networkcalc.samples instead",
            ));
        }
        (Mode::All, None) => mode
            .endpoints()
            .into_iter()
            .map(|endpoint| (endpoint, sample_for(endpoint, samples).to_string()))
            .collect(),
    };

    for (endpoint, input) in &plan {
        endpoint.validate_input(input)?;
    }
    Ok(plan)
}

fn sample_for(endpoint: Endpoint, samples: &SampleInputs) -> &str {
    match endpoint {
        Endpoint::Ip => &samples.ip,
        Endpoint::Binary => &samples.binary,
        Endpoint::Certificate => &samples.certificate,
    }
}

/// Fetch, transform and load each planned request, stopping at the first error.
pub async fn run_networkcalc(
    client: &NetworkCalcClient,
    store: &dyn RecordStore,
    mode: Mode,
    input: Option<&str>,
    samples: &SampleInputs,
) -> Result<EtlSummary> {
    let plan = plan_requests(mode, input, samples)?;
    let mut summary = EtlSummary::new(plan.len());

    for (endpoint, input) in &plan {
        let raw = client.fetch(*endpoint, input).await?;
        let record = IngestedRecord::from_networkcalc(endpoint.as_str(), input, raw);

        summary.attempted += 1;
        store.insert_one(&record).await?;
        summary.inserted += 1;
    }

    log::info!(
        "NetworkCalc ETL finished. Total inserted: {}",
        summary.inserted
    );
    Ok(summary)
}
