//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP client behavior shared by both connectors
    #[serde(default)]
    pub http: HttpConfig,

    /// AlienVault OTX settings
    #[serde(default)]
    pub otx: OtxConfig,

    /// NetworkCalc settings
    #[serde(default)]
    pub networkcalc: NetworkCalcConfig,

    /// Document store settings
    #[serde(default)]
    pub store: StoreConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("No config file at {:?}, using defaults", path);
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            log::warn!("Config load failed from {:?}: {}. Using defaults.", path, e);
            Self::default()
        })
    }

    /// Load the TOML file (if any) and apply environment overrides on top.
    pub fn resolve(path: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self::load_or_default(path);
        config.apply_process_env()?;
        Ok(config)
    }

    /// Override values from the process environment.
    pub fn apply_process_env(&mut self) -> Result<()> {
        self.apply_env(|key| std::env::var(key).ok())
    }

    /// Override values from an environment lookup. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("OTX_API_KEY") {
            self.otx.api_key = Some(v);
        }
        if let Some(v) = get("OTX_BASE") {
            self.otx.base_url = v;
        }
        if let Some(v) = get("NETWORKCALC_BASE") {
            self.networkcalc.base_url = v;
        }
        if let Some(v) = get("NETWORKCALC_API_KEY") {
            self.networkcalc.api_key = Some(v);
        }
        if let Some(v) = get("MONGO_URI") {
            self.store.uri = v;
        }
        if let Some(v) = get("MONGO_DB") {
            self.store.database = v;
        }
        if let Some(v) = get("COLLECTION_NAME") {
            self.store.collection = v;
        }
        if let Some(v) = get("STORE_BACKEND") {
            self.store.backend = v.parse()?;
        }
        if let Some(v) = get("HTTP_TIMEOUT_SECS") {
            self.http.timeout_secs = v.trim().parse().map_err(|_| {
                AppError::config(format!("HTTP_TIMEOUT_SECS is not a number: {v}"))
            })?;
        }
        Ok(())
    }

    /// Validate settings needed by the OTX connector.
    pub fn validate_otx(&self) -> Result<()> {
        self.validate_http()?;
        if self.otx.api_key.as_deref().is_none_or(|k| k.trim().is_empty()) {
            return Err(AppError::config(
                "OTX_API_KEY not found in environment or .env file",
            ));
        }
        validate_base_url("otx.base_url", &self.otx.base_url)?;
        self.validate_store()
    }

    /// Validate settings needed by the NetworkCalc connector.
    pub fn validate_networkcalc(&self) -> Result<()> {
        self.validate_http()?;
        validate_base_url("networkcalc.base_url", &self.networkcalc.base_url)?;
        for (name, base) in [
            ("networkcalc.binary_from", self.networkcalc.binary_from),
            ("networkcalc.binary_to", self.networkcalc.binary_to),
        ] {
            if !(2..=36).contains(&base) {
                return Err(AppError::validation(format!(
                    "{name} must be between 2 and 36"
                )));
            }
        }
        self.validate_store()
    }

    /// Validate document store settings.
    pub fn validate_store(&self) -> Result<()> {
        match self.store.backend {
            StoreBackend::Mongo => {
                if self.store.uri.trim().is_empty() {
                    return Err(AppError::config("MONGO_URI is empty"));
                }
                if self.store.database.trim().is_empty() {
                    return Err(AppError::config("MONGO_DB is empty"));
                }
                if self.store.collection.trim().is_empty() {
                    return Err(AppError::config("COLLECTION_NAME is empty"));
                }
                if self.store.server_selection_timeout_ms == 0 {
                    return Err(AppError::validation(
                        "store.server_selection_timeout_ms must be > 0",
                    ));
                }
            }
            StoreBackend::Local => {
                if self.store.local_dir.trim().is_empty() {
                    return Err(AppError::validation("store.local_dir is empty"));
                }
            }
        }
        Ok(())
    }

    fn validate_http(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        Ok(())
    }
}

fn validate_base_url(name: &str, value: &str) -> Result<()> {
    let url = url::Url::parse(value)
        .map_err(|e| AppError::config(format!("{name} is not a valid URL ({value}): {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::config(format!("{name} must be http(s): {value}")));
    }
    Ok(())
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// AlienVault OTX settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtxConfig {
    /// Indicators API root, e.g. `https://otx.alienvault.com/api/v1/indicators`
    #[serde(default = "defaults::otx_base")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for OtxConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::otx_base(),
            api_key: None,
        }
    }
}

/// NetworkCalc settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkCalcConfig {
    #[serde(default = "defaults::networkcalc_base")]
    pub base_url: String,

    /// Sent as a bearer token when present
    #[serde(default)]
    pub api_key: Option<String>,

    /// Radix of the number given to the binary endpoint
    #[serde(default = "defaults::binary_from")]
    pub binary_from: u32,

    /// Radix the binary endpoint converts to
    #[serde(default = "defaults::binary_to")]
    pub binary_to: u32,

    /// Inputs used by `--mode all` when no `--input` is given
    #[serde(default)]
    pub samples: SampleInputs,
}

impl Default for NetworkCalcConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::networkcalc_base(),
            api_key: None,
            binary_from: defaults::binary_from(),
            binary_to: defaults::binary_to(),
            samples: SampleInputs::default(),
        }
    }
}

/// Per-endpoint sample inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleInputs {
    #[serde(default = "defaults::sample_ip")]
    pub ip: String,
    #[serde(default = "defaults::sample_binary")]
    pub binary: String,
    #[serde(default = "defaults::sample_certificate")]
    pub certificate: String,
}

impl Default for SampleInputs {
    fn default() -> Self {
        Self {
            ip: defaults::sample_ip(),
            binary: defaults::sample_binary(),
            certificate: defaults::sample_certificate(),
        }
    }
}

/// Which document store receives the records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Mongo,
    /// JSON-lines file under `local_dir`
    Local,
}

impl FromStr for StoreBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(Self::Mongo),
            "local" => Ok(Self::Local),
            other => Err(AppError::config(format!(
                "Unknown store backend '{other}' (expected mongo or local)"
            ))),
        }
    }
}

/// Document store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    #[serde(default = "defaults::mongo_uri")]
    pub uri: String,

    #[serde(default = "defaults::database")]
    pub database: String,

    #[serde(default = "defaults::collection")]
    pub collection: String,

    #[serde(default = "defaults::server_selection_timeout")]
    pub server_selection_timeout_ms: u64,

    /// Root directory for the local backend
    #[serde(default = "defaults::local_dir")]
    pub local_dir: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            uri: defaults::mongo_uri(),
            database: defaults::database(),
            collection: defaults::collection(),
            server_selection_timeout_ms: defaults::server_selection_timeout(),
            local_dir: defaults::local_dir(),
        }
    }
}

mod defaults {
    // HTTP defaults
    pub fn user_agent() -> String {
        concat!("intel-etl/", env!("CARGO_PKG_VERSION")).into()
    }
    pub fn timeout() -> u64 {
        15
    }

    // API defaults
    pub fn otx_base() -> String {
        "https://otx.alienvault.com/api/v1/indicators".into()
    }
    pub fn networkcalc_base() -> String {
        "https://networkcalc.com/api".into()
    }
    pub fn binary_from() -> u32 {
        10
    }
    pub fn binary_to() -> u32 {
        2
    }
    pub fn sample_ip() -> String {
        "192.168.1.1/24".into()
    }
    pub fn sample_binary() -> String {
        "255".into()
    }
    pub fn sample_certificate() -> String {
        "networkcalc.com".into()
    }

    // Store defaults
    pub fn mongo_uri() -> String {
        "mongodb://localhost:27017".into()
    }
    pub fn database() -> String {
        "threat_intel".into()
    }
    pub fn collection() -> String {
        "intel_records".into()
    }
    pub fn server_selection_timeout() -> u64 {
        5000
    }
    pub fn local_dir() -> String {
        "data".into()
    }
}
