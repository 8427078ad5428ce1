// src/lib.rs

//! Threat and network intelligence ETL library
//!
//! Each connector fetches JSON from one API, wraps it in an
//! [`models::IngestedRecord`] and hands it to a [`storage::RecordStore`].

pub mod cli;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
