//! Pipeline entry points for the connectors.
//!
//! - `run_otx`: OTX IPv4 general data, failing items are skipped
//! - `run_networkcalc`: NetworkCalc lookups, the first failure aborts

pub mod networkcalc;
pub mod otx;

pub use networkcalc::{plan_requests, run_networkcalc};
pub use otx::{parse_ip_list, run_otx};

/// Counters for one ETL run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EtlSummary {
    /// Inputs given to the run
    pub requested: usize,
    /// Inputs dropped by a fetch or transform error
    pub skipped: usize,
    /// Records handed to the store
    pub attempted: usize,
    /// Records the store accepted
    pub inserted: usize,
}

impl EtlSummary {
    pub fn new(requested: usize) -> Self {
        Self {
            requested,
            ..Self::default()
        }
    }
}
