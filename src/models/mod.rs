// src/models/mod.rs

//! Domain models for the ETL connectors.

mod config;
mod record;

pub use config::{
    Config, HttpConfig, NetworkCalcConfig, OtxConfig, SampleInputs, StoreBackend, StoreConfig,
};
pub use record::{IngestedRecord, OTX_IP_GENERAL, Source};
