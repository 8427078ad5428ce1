// src/services/networkcalc.rs

//! NetworkCalc API client.
//!
//! Three endpoints are supported:
//! - `ip/{address[/prefix]}`: subnet calculator
//! - `binary/{number}?from=&to=`: radix conversion
//! - `security/certificate/{hostname}`: TLS certificate details

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::NetworkCalcConfig;
use crate::utils::endpoint_url;
use crate::utils::http::ApiClient;

/// A single NetworkCalc endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Ip,
    Binary,
    Certificate,
}

impl Endpoint {
    pub const ALL: [Endpoint; 3] = [Endpoint::Ip, Endpoint::Binary, Endpoint::Certificate];

    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Ip => "ip",
            Endpoint::Binary => "binary",
            Endpoint::Certificate => "certificate",
        }
    }

    /// Check that `input` is something this endpoint can answer for.
    pub fn validate_input(&self, input: &str) -> Result<()> {
        let ok = match self {
            Endpoint::Ip => is_ipv4_or_subnet(input),
            Endpoint::Binary => !input.is_empty() && input.chars().all(|c| c.is_ascii_alphanumeric()),
            Endpoint::Certificate => hostname_regex().is_match(input),
        };
        if ok {
            Ok(())
        } else {
            Err(AppError::validation(format!(
                "'{input}' is not a valid {} input",
                self.as_str()
            )))
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a NetworkCalc run fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Single(Endpoint),
    All,
}

impl Mode {
    pub fn endpoints(&self) -> Vec<Endpoint> {
        match self {
            Mode::Single(endpoint) => vec![*endpoint],
            Mode::All => Endpoint::ALL.to_vec(),
        }
    }
}

impl FromStr for Mode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ip" => Ok(Mode::Single(Endpoint::Ip)),
            "binary" => Ok(Mode::Single(Endpoint::Binary)),
            "certificate" => Ok(Mode::Single(Endpoint::Certificate)),
            "all" => Ok(Mode::All),
            other => Err(AppError::validation(format!(
                "Unknown mode '{other}' (expected ip, binary, certificate or all)"
            ))),
        }
    }
}

/// Client for the NetworkCalc REST API.
pub struct NetworkCalcClient {
    api: ApiClient,
    base_url: String,
    binary_from: u32,
    binary_to: u32,
    headers: HeaderMap,
}

impl NetworkCalcClient {
    pub fn new(api: ApiClient, config: &NetworkCalcConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(key) = config.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {key}")).map_err(|e| {
                AppError::config(format!("NETWORKCALC_API_KEY is not a valid header value: {e}"))
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        Ok(Self {
            api,
            base_url: config.base_url.clone(),
            binary_from: config.binary_from,
            binary_to: config.binary_to,
            headers,
        })
    }

    /// Build the request URL for `endpoint` and `input`.
    pub fn url(&self, endpoint: Endpoint, input: &str) -> Result<url::Url> {
        endpoint.validate_input(input)?;

        let url = match endpoint {
            Endpoint::Ip => {
                let mut segments = vec!["ip"];
                segments.extend(input.split('/'));
                endpoint_url(&self.base_url, &segments)?
            }
            Endpoint::Binary => {
                let mut url = endpoint_url(&self.base_url, &["binary", input])?;
                url.query_pairs_mut()
                    .append_pair("from", &self.binary_from.to_string())
                    .append_pair("to", &self.binary_to.to_string());
                url
            }
            Endpoint::Certificate => {
                endpoint_url(&self.base_url, &["security", "certificate", input])?
            }
        };
        Ok(url)
    }

    /// Fetch one endpoint for one input.
    pub async fn fetch(&self, endpoint: Endpoint, input: &str) -> Result<Value> {
        let url = self.url(endpoint, input)?;
        log::info!("Fetching NetworkCalc {} data for: {}", endpoint, input);
        self.api.get_json(url.as_str(), &self.headers).await
    }
}

fn is_ipv4_or_subnet(input: &str) -> bool {
    let (addr, prefix) = match input.split_once('/') {
        Some((addr, prefix)) => (addr, Some(prefix)),
        None => (input, None),
    };
    if addr.parse::<Ipv4Addr>().is_err() {
        return false;
    }
    match prefix {
        None => true,
        Some(p) => p.parse::<u8>().is_ok_and(|p| p <= 32),
    }
}

fn hostname_regex() -> &'static Regex {
    static HOSTNAME: OnceLock<Regex> = OnceLock::new();
    HOSTNAME.get_or_init(|| {
        Regex::new(r"^(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,63}$")
            .expect("hostname pattern is valid")
    })
}
