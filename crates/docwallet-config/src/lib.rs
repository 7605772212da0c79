//! Shared configuration for docwallet tools.
//!
//! A TOML file in the platform config directory, `DOCWALLET_*`
//! environment overrides, API token resolution (env + keyring +
//! plaintext), and translation into `docwallet_core::WalletConfig` and
//! `docwallet_api::TransportConfig`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use docwallet_api::{TlsMode, TransportConfig};
use docwallet_core::cards::DriverLicenseUrls;
use docwallet_core::config::{DEFAULT_CODE_TTL, DEFAULT_EVENT_CAPACITY};
use docwallet_core::{DocTypeCode, Localization, RecordComparison, WalletConfig};

const KEYRING_SERVICE: &str = "docwallet";
const ENV_PREFIX: &str = "DOCWALLET_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API token configured")]
    NoToken,

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiSection,

    #[serde(default)]
    pub wallet: WalletSection,
}

/// Where and how to reach the sharing API.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ApiSection {
    /// Base URL of the API (e.g., "https://api.example.gov.ua").
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// API token (plaintext; prefer keyring or env var).
    pub token: Option<String>,

    /// Environment variable name containing the API token.
    pub token_env: Option<String>,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: default_timeout(),
            token: None,
            token_env: None,
            ca_cert: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".into()
}
fn default_timeout() -> u64 {
    30
}

/// Collection and verification behavior.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WalletSection {
    /// Code lifetime when the server sends none, in seconds.
    #[serde(default = "default_code_ttl")]
    pub code_ttl_secs: u64,

    /// Document types whose action sheet offers the QR/barcode toggle.
    #[serde(default)]
    pub code_action_allowed_types: Vec<DocTypeCode>,

    /// "full" or "identity".
    #[serde(default)]
    pub record_comparison: RecordComparison,

    /// "ua" or "en".
    #[serde(default)]
    pub localization: Localization,

    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    pub driver_queue_url: Option<String>,
    pub service_center_url: Option<String>,
}

impl Default for WalletSection {
    fn default() -> Self {
        Self {
            code_ttl_secs: default_code_ttl(),
            code_action_allowed_types: Vec::new(),
            record_comparison: RecordComparison::default(),
            localization: Localization::default(),
            event_capacity: default_event_capacity(),
            driver_queue_url: None,
            service_center_url: None,
        }
    }
}

fn default_code_ttl() -> u64 {
    DEFAULT_CODE_TTL.as_secs()
}
fn default_event_capacity() -> usize {
    DEFAULT_EVENT_CAPACITY
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "docwallet", "docwallet").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("docwallet");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Defaults, then the TOML file at `path`, then `DOCWALLET_*` variables.
/// Nested keys use a double underscore: `DOCWALLET_API__BASE_URL`.
pub fn figment_for(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = figment_for(path).extract()?;
    debug!(path = %path.display(), "config loaded");
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Token resolution ────────────────────────────────────────────────

/// Resolve the API token from the credential chain: the variable named
/// by `token_env`, the system keyring, then the plaintext `token`.
pub fn resolve_token(api: &ApiSection) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = api.token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, "api-token") {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    if let Some(ref token) = api.token {
        return Ok(SecretString::from(token.clone()));
    }

    Err(ConfigError::NoToken)
}

// ── Translation ─────────────────────────────────────────────────────

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.api.base_url).map_err(|e| ConfigError::Validation {
            field: "api.base_url".into(),
            reason: format!("invalid URL '{}': {e}", self.api.base_url),
        })?;
        if self.wallet.code_ttl_secs == 0 {
            return Err(ConfigError::Validation {
                field: "wallet.code_ttl_secs".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }

    pub fn to_wallet_config(&self) -> WalletConfig {
        WalletConfig {
            code_ttl: Duration::from_secs(self.wallet.code_ttl_secs),
            code_action_allowed_types: self.wallet.code_action_allowed_types.clone(),
            record_comparison: self.wallet.record_comparison,
            default_localization: self.wallet.localization,
            event_capacity: self.wallet.event_capacity,
        }
    }

    pub fn to_transport_config(&self) -> TransportConfig {
        let tls = self
            .api
            .ca_cert
            .clone()
            .map_or(TlsMode::System, TlsMode::CustomCa);
        TransportConfig {
            tls,
            timeout: Duration::from_secs(self.api.timeout),
        }
    }

    pub fn to_driver_license_urls(&self) -> DriverLicenseUrls {
        let defaults = DriverLicenseUrls::default();
        DriverLicenseUrls {
            driver_queue: self
                .wallet
                .driver_queue_url
                .clone()
                .unwrap_or(defaults.driver_queue),
            service_center: self
                .wallet
                .service_center_url
                .clone()
                .unwrap_or(defaults.service_center),
        }
    }
}
