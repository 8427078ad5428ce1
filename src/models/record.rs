//! Envelope record wrapping one raw API response.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, Result};

/// API a record was pulled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Otx,
    NetworkCalc,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Otx => "otx",
            Source::NetworkCalc => "networkcalc",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ingested document.
///
/// Built once per successful fetch and handed to the store as is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestedRecord {
    pub source: Source,

    /// Endpoint within the source (`ip_general`, `ip`, `binary`, `certificate`)
    pub endpoint: String,

    /// IP, subnet, number or hostname exactly as requested
    pub input: String,

    pub ingested_at: DateTime<Utc>,

    /// Response body, untouched
    pub raw: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pulse_count: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_malicious: Option<bool>,
}

/// Endpoint name used for OTX IPv4 general records.
pub const OTX_IP_GENERAL: &str = "ip_general";

impl IngestedRecord {
    /// Wrap an OTX IPv4 `general` response.
    ///
    /// Rejects payloads that are not JSON objects, and empty objects. Missing
    /// `pulse_info.count` and `reputation.malicious` fall back to `0` and
    /// `false`; a count that is not a non-negative integer is read as `0`.
    pub fn from_otx(ip: &str, raw: Value) -> Result<Self> {
        match raw.as_object() {
            None => {
                return Err(AppError::validation(format!(
                    "Unexpected response type for {ip}: {}",
                    json_kind(&raw)
                )));
            }
            Some(fields) if fields.is_empty() => {
                return Err(AppError::validation(format!("Empty response for {ip}")));
            }
            Some(_) => {}
        }

        let pulse_count = match raw.get("pulse_info").and_then(|p| p.get("count")) {
            None | Some(Value::Null) => 0,
            Some(count) => count.as_u64().unwrap_or_else(|| {
                log::debug!("Pulse count for {} is not a count ({}), using 0", ip, count);
                0
            }),
        };

        let is_malicious = raw
            .get("reputation")
            .and_then(|r| r.get("malicious"))
            .and_then(Value::as_bool)
            .unwrap_or(false);

        Ok(Self {
            source: Source::Otx,
            endpoint: OTX_IP_GENERAL.to_string(),
            input: ip.to_string(),
            ingested_at: Utc::now(),
            raw,
            pulse_count: Some(pulse_count),
            is_malicious: Some(is_malicious),
        })
    }

    /// Wrap a NetworkCalc response. No fields are derived.
    pub fn from_networkcalc(endpoint: &str, input: &str, raw: Value) -> Self {
        Self {
            source: Source::NetworkCalc,
            endpoint: endpoint.to_string(),
            input: input.to_string(),
            ingested_at: Utc::now(),
            raw,
            pulse_count: None,
            is_malicious: None,
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
