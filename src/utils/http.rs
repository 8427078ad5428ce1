// src/utils/http.rs

//! HTTP client utilities.
//!
//! One [`ApiClient`] is created per run and shared by every request. It only
//! issues GETs and only accepts JSON bodies. Each request is sent once; a
//! failed item is dropped by the caller rather than retried here.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::HeaderMap;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::HttpConfig;

/// Create a configured asynchronous HTTP client.
pub fn create_client(config: &HttpConfig) -> Result<Client> {
    let client = Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// GET-only JSON client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
}

impl ApiClient {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        Ok(Self::with_client(create_client(config)?))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// GET `url` and parse the body as JSON.
    ///
    /// Any non-2xx status or a body that does not parse is an error.
    pub async fn get_json(&self, url: &str, headers: &HeaderMap) -> Result<Value> {
        let response = self.client.get(url).headers(headers.clone()).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AppError::status(url, status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|_| AppError::non_json(url, &body))
    }
}
