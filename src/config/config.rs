use std::path::Path;

use alloy::primitives::Address;
use config::{Config, ConfigError, Environment, File};
use log::LevelFilter;
use serde::Deserialize;

/// Node connection configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct RpcSettings {
    pub url: String,
}

/// Location of the deployed PaymentChannel contract.
#[derive(Debug, Deserialize, Clone)]
pub struct ContractSettings {
    pub address: Address,
}

/// Local signing key. Without it the client is read-only and can still
/// call, estimate and populate, but not send transactions.
#[derive(Deserialize, Clone)]
pub struct SignerSettings {
    pub private_key: String,
}

impl std::fmt::Debug for SignerSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignerSettings")
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Event querying and polling configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct EventSettings {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_milliseconds: u64,
    /// Largest block span requested in one `eth_getLogs` call
    #[serde(default = "default_max_block_range")]
    pub max_block_range: u64,
    /// Blocks behind the head the watcher stays, to ride out shallow reorgs
    #[serde(default)]
    pub confirmations: u64,
    /// Chunked `eth_getLogs` requests kept in flight at once
    #[serde(default = "default_query_concurrency")]
    pub query_concurrency: usize,
}

impl Default for EventSettings {
    fn default() -> Self {
        Self {
            poll_interval_milliseconds: default_poll_interval(),
            max_block_range: default_max_block_range(),
            confirmations: 0,
            query_concurrency: default_query_concurrency(),
        }
    }
}

fn default_poll_interval() -> u64 {
    1_000
}

fn default_max_block_range() -> u64 {
    10_000
}

fn default_query_concurrency() -> usize {
    4
}

/// Receipt waiting configuration for sent transactions.
#[derive(Debug, Deserialize, Clone)]
pub struct TransactionSettings {
    #[serde(default = "default_required_confirmations")]
    pub required_confirmations: u64,
    #[serde(default = "default_receipt_timeout_secs")]
    pub receipt_timeout_secs: u64,
}

impl Default for TransactionSettings {
    fn default() -> Self {
        Self {
            required_confirmations: default_required_confirmations(),
            receipt_timeout_secs: default_receipt_timeout_secs(),
        }
    }
}

fn default_required_confirmations() -> u64 {
    1
}

fn default_receipt_timeout_secs() -> u64 {
    120
}

/// Root application configuration.
///
/// Loaded from an optional `config.{yaml,toml,json}` in the working directory,
/// then overridden by `PAYCHAN__SECTION__KEY` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    pub rpc: RpcSettings,
    pub contract: ContractSettings,
    #[serde(default)]
    pub signer: Option<SignerSettings>,
    #[serde(default)]
    pub events: EventSettings,
    #[serde(default)]
    pub transactions: TransactionSettings,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::build(File::with_name("config").required(false))
    }

    /// Load settings from an explicit file, still honouring environment overrides.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::build(File::from(path.as_ref()))
    }

    fn build<S>(file: S) -> Result<Self, ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let s = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("PAYCHAN")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let settings: Settings = s.try_deserialize()?;

        Ok(settings)
    }

    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::Message(format!("Invalid log_level: {}", self.log_level)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_yaml(yaml: &str) -> Result<Settings, ConfigError> {
        Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()?
            .try_deserialize()
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let settings = from_yaml(
            r#"
rpc:
  url: http://localhost:8545
contract:
  address: "0x5FbDB2315678afecb367f032d93F642f64180aa3"
"#,
        )
        .unwrap();

        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.level_filter().unwrap(), LevelFilter::Info);
        assert!(settings.signer.is_none());
        assert_eq!(settings.events.poll_interval_milliseconds, 1_000);
        assert_eq!(settings.events.max_block_range, 10_000);
        assert_eq!(settings.events.confirmations, 0);
        assert_eq!(settings.events.query_concurrency, 4);
        assert_eq!(settings.transactions.required_confirmations, 1);
        assert_eq!(settings.transactions.receipt_timeout_secs, 120);
        assert_eq!(
            settings.contract.address,
            "0x5FbDB2315678afecb367f032d93F642f64180aa3"
                .parse::<Address>()
                .unwrap()
        );
    }

    #[test]
    fn test_full_config() {
        let settings = from_yaml(
            r#"
log_level: debug
rpc:
  url: http://node:8545
contract:
  address: "0x5FbDB2315678afecb367f032d93F642f64180aa3"
signer:
  private_key: "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
events:
  poll_interval_milliseconds: 250
  max_block_range: 500
  confirmations: 3
  query_concurrency: 1
transactions:
  required_confirmations: 2
  receipt_timeout_secs: 30
"#,
        )
        .unwrap();

        assert_eq!(settings.level_filter().unwrap(), LevelFilter::Debug);
        assert!(settings.signer.is_some());
        assert_eq!(settings.events.poll_interval_milliseconds, 250);
        assert_eq!(settings.events.max_block_range, 500);
        assert_eq!(settings.events.confirmations, 3);
        assert_eq!(settings.events.query_concurrency, 1);
        assert_eq!(settings.transactions.required_confirmations, 2);
        assert_eq!(settings.transactions.receipt_timeout_secs, 30);
    }

    #[test]
    fn test_missing_contract_address_is_an_error() {
        assert!(from_yaml("rpc:\n  url: http://localhost:8545\n").is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut settings = from_yaml(
            r#"
rpc:
  url: http://localhost:8545
contract:
  address: "0x5FbDB2315678afecb367f032d93F642f64180aa3"
"#,
        )
        .unwrap();
        settings.log_level = "loud".to_string();

        assert!(settings.level_filter().is_err());
    }

    #[test]
    fn test_signer_debug_redacts_key() {
        let signer = SignerSettings {
            private_key: "0xdeadbeef".to_string(),
        };
        let rendered = format!("{signer:?}");

        assert!(!rendered.contains("deadbeef"));
        assert!(rendered.contains("redacted"));
    }
}
