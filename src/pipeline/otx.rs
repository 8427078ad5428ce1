// src/pipeline/otx.rs

//! OTX IPv4 pipeline.

use crate::error::Result;
use crate::models::IngestedRecord;
use crate::services::OtxClient;
use crate::storage::RecordStore;

use super::EtlSummary;

/// Split a comma-separated IP list, dropping blanks.
pub fn parse_ip_list(arg: &str) -> Vec<String> {
    arg.split(',')
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
        .collect()
}

/// Fetch, transform and load every IP.
///
/// A fetch or transform failure skips that IP only. A store failure during
/// the final insert is logged and reported as nothing inserted. Only a
/// failure to prepare the store index aborts the run.
pub async fn run_otx(
    client: &OtxClient,
    store: &dyn RecordStore,
    ips: &[String],
) -> Result<EtlSummary> {
    store.ensure_index().await?;

    let mut summary = EtlSummary::new(ips.len());
    let mut records = Vec::with_capacity(ips.len());

    for ip in ips {
        let raw = match client.fetch_ip_general(ip).await {
            Ok(raw) => raw,
            Err(e) => {
                log::error!("Fetch failed for {}: {}", ip, e);
                log::warn!("Skipping {} due to fetch error.", ip);
                summary.skipped += 1;
                continue;
            }
        };

        match IngestedRecord::from_otx(ip, raw) {
            Ok(record) => records.push(record),
            Err(e) => {
                log::error!("{}", e);
                log::warn!("Skipping {} due to transform error.", ip);
                summary.skipped += 1;
            }
        }
    }

    summary.attempted = records.len();
    summary.inserted = match store.insert_many(&records).await {
        Ok(inserted) => inserted,
        Err(e) => {
            log::error!("Store error: {}", e);
            0
        }
    };

    log::info!(
        "ETL finished. Requested: {}, skipped: {}, total inserted: {}",
        summary.requested,
        summary.skipped,
        summary.inserted
    );
    Ok(summary)
}
