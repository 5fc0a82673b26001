//! relaytx configuration file
//!
//! Values are read from `relaytx.toml` (or the file named by `--config`) and may be
//! overridden by command line flags. Required values that are still missing after
//! both are applied are reported before any network call is made.

use relaytx_core::types::{parse_coins, CoinError, DEFAULT_ADDRESS_PREFIX};
use relaytx_middleware::{TxConfig, DEFAULT_GAS_LIMIT};
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;

/// Configuration file looked up in the working directory when `--config` is absent
pub const CONFIG_FILE: &str = "relaytx.toml";

/// Environment variable holding the hex private key unless `key_env` says otherwise
pub const DEFAULT_KEY_ENV: &str = "RELAYTX_PRIVATE_KEY";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid configuration in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("missing required setting `{0}` (set it in relaytx.toml or pass it as a flag)")]
    Missing(&'static str),
    #[error("invalid fees: {0}")]
    InvalidFees(#[from] CoinError),
}

/// The `[tx]` table. Every field is optional here; see [`RelaytxConfig::tx_config`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TxSection {
    pub chain_id: Option<String>,
    pub gas_limit: Option<u64>,
    pub fees: Option<String>,
    pub memo: Option<String>,
    pub timeout_height: Option<u64>,
    pub sequence_retry: Option<bool>,
}

/// relaytx configuration
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RelaytxConfig {
    /// JSON-RPC endpoint of the node
    pub rpc_url: Option<String>,
    /// Bearer token sent with every request
    pub rpc_token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Keyring identity that signs
    pub key_name: Option<String>,
    #[serde(default = "default_key_env")]
    pub key_env: String,
    #[serde(default = "default_address_prefix")]
    pub address_prefix: String,
    #[serde(default)]
    pub tx: TxSection,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_key_env() -> String {
    DEFAULT_KEY_ENV.to_owned()
}

fn default_address_prefix() -> String {
    DEFAULT_ADDRESS_PREFIX.to_owned()
}

impl Default for RelaytxConfig {
    fn default() -> Self {
        Self {
            rpc_url: None,
            rpc_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            key_name: None,
            key_env: default_key_env(),
            address_prefix: default_address_prefix(),
            tx: TxSection::default(),
        }
    }
}

/// Values given on the command line, which win over the file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub rpc_url: Option<String>,
    pub chain_id: Option<String>,
    pub key_name: Option<String>,
    pub gas_limit: Option<u64>,
    pub fees: Option<String>,
}

impl RelaytxConfig {
    /// Loads `path`, or [`CONFIG_FILE`] if it exists when no path is given.
    ///
    /// An explicitly named file must exist; a missing default file yields the
    /// default configuration.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(CONFIG_FILE).exists() => Self::from_file(Path::new(CONFIG_FILE)),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_owned(), source })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse { path: path.to_owned(), source })
    }

    #[must_use]
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if overrides.rpc_url.is_some() {
            self.rpc_url = overrides.rpc_url;
        }
        if overrides.key_name.is_some() {
            self.key_name = overrides.key_name;
        }
        if overrides.chain_id.is_some() {
            self.tx.chain_id = overrides.chain_id;
        }
        if overrides.gas_limit.is_some() {
            self.tx.gas_limit = overrides.gas_limit;
        }
        if overrides.fees.is_some() {
            self.tx.fees = overrides.fees;
        }
        self
    }

    pub fn rpc_url(&self) -> Result<&str, ConfigError> {
        self.rpc_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing("rpc_url"))
    }

    pub fn key_name(&self) -> Result<&str, ConfigError> {
        self.key_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .ok_or(ConfigError::Missing("key_name"))
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// The pipeline configuration, once chain id and key name are known
    pub fn tx_config(&self) -> Result<TxConfig, ConfigError> {
        let chain_id = self
            .tx
            .chain_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or(ConfigError::Missing("tx.chain_id"))?;
        let mut config = TxConfig::new(chain_id, self.key_name()?)
            .gas_limit(self.tx.gas_limit.unwrap_or(DEFAULT_GAS_LIMIT))
            .memo(self.tx.memo.clone().unwrap_or_default())
            .timeout_height(self.tx.timeout_height.unwrap_or_default())
            .sequence_retry(self.tx.sequence_retry.unwrap_or_default());
        if let Some(fees) = &self.tx.fees {
            config.fees = parse_coins(fees)?;
        }
        Ok(config)
    }
}
