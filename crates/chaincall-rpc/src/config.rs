//! Client configuration and tracing initialisation.
//!
//! ```yaml
//! rpc_url: "https://mainnet.optimism.io"
//! request_timeout_ms: 15000
//! max_retries: 5
//! log:
//!   level: info
//!   components:
//!     chaincall-rpc: debug
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use chaincall_core::Address;
use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::ChainError;
use crate::retry::RetryPolicy;

/// Connection settings for one JSON-RPC endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// HTTP(S) JSON-RPC endpoint
    pub rpc_url: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Retries after the first attempt, for transient failures only
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Initial backoff; doubles on each retry
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// ReverseRecords contract to use instead of the mainnet deployment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ens_reverse_records: Option<Address>,
    #[serde(default)]
    pub log: LogConfig,
}

fn default_request_timeout_ms() -> u64 { 30_000 }
fn default_max_retries() -> u32 { 3 }
fn default_backoff_ms() -> u64 { 250 }
fn default_max_backoff_ms() -> u64 { 10_000 }

impl ClientConfig {
    /// Defaults for everything but the endpoint.
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            request_timeout_ms: default_request_timeout_ms(),
            max_retries: default_max_retries(),
            backoff_ms: default_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            ens_reverse_records: None,
            log: LogConfig::default(),
        }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ChainError> {
        serde_yaml::from_str(yaml).map_err(|e| ChainError::Config(e.to_string()))
    }

    pub fn from_json_str(json: &str) -> Result<Self, ChainError> {
        serde_json::from_str(json).map_err(|e| ChainError::Config(e.to_string()))
    }

    /// Load from a `.json`, `.yaml` or `.yml` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ChainError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ChainError::Config(format!("{}: {e}", path.display())))?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&text),
            other => Err(ChainError::Config(format!(
                "{}: unsupported config extension {other:?}",
                path.display()
            ))),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            initial_backoff: Duration::from_millis(self.backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
        }
    }
}

/// Log level, per-component overrides and output format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// "trace" | "debug" | "info" | "warn" | "error"
    #[serde(default = "default_level")]
    pub level: String,
    /// component (crate) name → level
    #[serde(default)]
    pub components: HashMap<String, String>,
    /// JSON lines instead of human-readable text
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            components: HashMap::new(),
            json: false,
        }
    }
}

impl LogConfig {
    /// `EnvFilter` directives, e.g. `"info,chaincall_rpc=debug"`.
    pub fn directives(&self) -> String {
        let mut components: Vec<_> = self.components.iter().collect();
        components.sort();
        let mut directives = self.level.clone();
        for (component, level) in components {
            directives.push_str(&format!(",{}={}", component.replace('-', "_"), level));
        }
        directives
    }
}

/// Install a global `tracing` subscriber. Call once at startup.
///
/// # Errors
/// `Config` if the directives do not parse or a subscriber is already set.
pub fn init_tracing(config: &LogConfig) -> Result<(), ChainError> {
    let filter = EnvFilter::try_new(config.directives())
        .map_err(|e| ChainError::Config(format!("log filter: {e}")))?;

    let installed = if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .try_init()
    };
    installed.map_err(|e| ChainError::Config(format!("tracing: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_fills_defaults() {
        let cfg = ClientConfig::from_yaml_str("rpc_url: https://mainnet.optimism.io\n").unwrap();
        assert_eq!(cfg, ClientConfig::new("https://mainnet.optimism.io"));
        assert_eq!(cfg.request_timeout(), Duration::from_secs(30));
        assert_eq!(cfg.retry_policy().max_retries, 3);
    }

    #[test]
    fn json_overrides() {
        let cfg = ClientConfig::from_json_str(
            r#"{
                "rpc_url": "http://localhost:8545",
                "max_retries": 0,
                "ens_reverse_records": "0x3671AE578E63FDF66AD4F3E12CC0C0D71AC7510C",
                "log": {"level": "debug", "json": true}
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.retry_policy().next_delay(1), None);
        assert_eq!(
            cfg.ens_reverse_records.unwrap().as_str(),
            "0x3671ae578e63fdf66ad4f3e12cc0c0d71ac7510c"
        );
        assert!(cfg.log.json);
    }

    #[test]
    fn missing_url_is_config_error() {
        assert!(matches!(
            ClientConfig::from_yaml_str("max_retries: 2\n"),
            Err(ChainError::Config(_))
        ));
    }

    #[test]
    fn directives_normalize_crate_names() {
        let mut log = LogConfig::default();
        log.components.insert("chaincall-rpc".into(), "debug".into());
        log.components.insert("chaincall-abi".into(), "trace".into());
        assert_eq!(log.directives(), "info,chaincall_abi=trace,chaincall_rpc=debug");
    }
}
