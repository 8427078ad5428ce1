//! API clients for the intelligence sources.
//!
//! - `OtxClient`: AlienVault OTX IPv4 indicators
//! - `NetworkCalcClient`: NetworkCalc subnet, binary and certificate lookups

mod networkcalc;
mod otx;

pub use networkcalc::{Endpoint, Mode, NetworkCalcClient};
pub use otx::{API_KEY_HEADER, OtxClient};
