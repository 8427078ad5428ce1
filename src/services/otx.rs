// src/services/otx.rs

//! AlienVault OTX indicator client.

use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::OtxConfig;
use crate::utils::endpoint_url;
use crate::utils::http::ApiClient;

/// Header carrying the OTX API key.
pub const API_KEY_HEADER: &str = "X-OTX-API-KEY";

/// Client for the OTX IPv4 `general` section.
pub struct OtxClient {
    api: ApiClient,
    base_url: String,
    headers: HeaderMap,
}

impl OtxClient {
    pub fn new(api: ApiClient, config: &OtxConfig) -> Result<Self> {
        let key = config
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::config("OTX_API_KEY not found in environment or .env file"))?;

        let mut value = HeaderValue::from_str(key)
            .map_err(|e| AppError::config(format!("OTX_API_KEY is not a valid header value: {e}")))?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, value);

        Ok(Self {
            api,
            base_url: config.base_url.clone(),
            headers,
        })
    }

    /// Fetch general threat data for one IPv4 address.
    pub async fn fetch_ip_general(&self, ip: &str) -> Result<Value> {
        let url = endpoint_url(&self.base_url, &["IPv4", ip, "general"])?;
        log::info!("Fetching OTX general data for IP: {}", ip);
        self.api.get_json(url.as_str(), &self.headers).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn otx_config(base_url: String, key: Option<&str>) -> OtxConfig {
        OtxConfig {
            base_url,
            api_key: key.map(str::to_string),
        }
    }

    fn api() -> ApiClient {
        ApiClient::with_client(reqwest::Client::new())
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let result = OtxClient::new(api(), &otx_config("http://localhost".into(), None));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn test_fetch_ip_general() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/indicators/IPv4/8.8.8.8/general"))
            .and(header(API_KEY_HEADER, "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"indicator": "8.8.8.8"})))
            .expect(1)
            .mount(&server)
            .await;

        let base = format!("{}/api/v1/indicators", server.uri());
        let client = OtxClient::new(api(), &otx_config(base, Some("secret"))).unwrap();

        let raw = client.fetch_ip_general("8.8.8.8").await.unwrap();
        assert_eq!(raw["indicator"], "8.8.8.8");
    }
}
