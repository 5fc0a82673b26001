//! relaytx subcommands
//!
//! - `submit-block-hashes`: build, sign and broadcast a `MsgNewBlockHashes`
//! - `account`: show the account number and sequence of an address
//! - `decode`: print the contents of an encoded transaction, offline

mod account;
mod decode;
mod submit_block_hashes;

use self::{account::AccountCmd, decode::DecodeCmd, submit_block_hashes::SubmitBlockHashesCmd};
use crate::config::{ConfigError, Overrides, RelaytxConfig};
use clap::{Parser, Subcommand};
use eyre::{eyre, WrapErr};
use relaytx_providers::{Authorization, Http, Provider};
use relaytx_signers::MemoryKeyring;
use std::{fmt, path::PathBuf, str::FromStr};
use url::Url;

/// Entry point of the command line.
#[derive(Debug, Parser)]
#[command(name = "relaytx", author, version, about)]
pub struct EntryPoint {
    #[command(subcommand)]
    pub cmd: RelaytxCmd,

    /// Use the specified config file instead of ./relaytx.toml
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// JSON-RPC endpoint of the node
    #[arg(long, global = true, env = "RELAYTX_RPC_URL")]
    pub rpc_url: Option<String>,

    #[arg(long, global = true)]
    pub chain_id: Option<String>,

    /// Keyring identity that signs
    #[arg(long, global = true)]
    pub key_name: Option<String>,

    /// Gas limit
    #[arg(long, global = true)]
    pub gas: Option<u64>,

    /// Fee coins, e.g. 1000ugoat
    #[arg(long, global = true)]
    pub fees: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl EntryPoint {
    /// Loads the configuration file and applies the command line overrides
    pub fn config(&self) -> Result<RelaytxConfig, ConfigError> {
        let config = RelaytxConfig::load(self.config.as_deref())?;
        Ok(config.with_overrides(Overrides {
            rpc_url: self.rpc_url.clone(),
            chain_id: self.chain_id.clone(),
            key_name: self.key_name.clone(),
            gas_limit: self.gas,
            fees: self.fees.clone(),
        }))
    }

    /// Runs the subcommand. `decode` is offline and never reads the
    /// configuration.
    pub async fn run(self) -> eyre::Result<()> {
        match &self.cmd {
            RelaytxCmd::Decode(cmd) => cmd.run(),
            RelaytxCmd::SubmitBlockHashes(cmd) => cmd.run(&self.config()?).await,
            RelaytxCmd::Account(cmd) => cmd.run(&self.config()?).await,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum RelaytxCmd {
    /// Submit a batch of consecutive block hashes
    SubmitBlockHashes(SubmitBlockHashesCmd),

    /// Show the account number and sequence of an address
    Account(AccountCmd),

    /// Decode a hex encoded transaction
    Decode(DecodeCmd),
}

/// Hex encoded bytes, with or without `0x`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HexBytes(pub Vec<u8>);

impl FromStr for HexBytes {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        hex::decode(s.strip_prefix("0x").unwrap_or(s)).map(HexBytes)
    }
}

impl fmt::Display for HexBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

/// Connects to the configured node
pub(crate) fn provider(config: &RelaytxConfig) -> eyre::Result<Provider<Http>> {
    let url = Url::parse(config.rpc_url()?).wrap_err("invalid rpc_url")?;
    let http = match &config.rpc_token {
        Some(token) => Http::new_with_auth(url, Authorization::bearer(token.as_str()))?,
        None => Http::new(url),
    };
    let provider = Provider::new(http);
    Ok(match config.timeout() {
        Some(timeout) => provider.with_timeout(timeout),
        None => provider,
    })
}

/// Loads the signing key named `key_name` from the configured environment variable
pub(crate) fn keyring(config: &RelaytxConfig, key_name: &str) -> eyre::Result<MemoryKeyring> {
    let private_key = std::env::var(&config.key_env).map_err(|_| {
        eyre!("environment variable {} must hold the private key of {key_name:?}", config.key_env)
    })?;
    let keyring = MemoryKeyring::new();
    keyring
        .import_hex(key_name, &private_key, &config.address_prefix)
        .wrap_err_with(|| format!("could not load the private key in {}", config.key_env))?;
    Ok(keyring)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags() {
        let entry = EntryPoint::try_parse_from([
            "relaytx",
            "--chain-id",
            "chain-1",
            "--gas",
            "150000",
            "--fees",
            "5denom",
            "--key-name",
            "k1",
            "--rpc-url",
            "http://localhost:26657",
            "account",
            "goat1xyz",
        ])
        .unwrap();
        assert!(matches!(entry.cmd, RelaytxCmd::Account(_)));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relaytx.toml");
        std::fs::write(&path, "[tx]\nchain_id = \"48815\"\nfees = \"1000ugoat\"\n").unwrap();
        let entry = EntryPoint { config: Some(path), ..entry };

        let config = entry.config().unwrap();
        let tx = config.tx_config().unwrap();
        assert_eq!(tx.chain_id, "chain-1");
        assert_eq!(tx.key_name, "k1");
        assert_eq!(tx.gas_limit, 150_000);
        assert_eq!(tx.fees[0].to_string(), "5denom");
    }

    #[test]
    fn hex_bytes() {
        assert_eq!("0xabcd".parse::<HexBytes>().unwrap(), HexBytes(vec![0xab, 0xcd]));
        assert_eq!("abcd".parse::<HexBytes>().unwrap().to_string(), "abcd");
        assert!("xyz".parse::<HexBytes>().is_err());
    }

    #[test]
    fn provider_requires_url() {
        let config = RelaytxConfig::default();
        let err = provider(&config).unwrap_err();
        assert!(err.to_string().contains("rpc_url"));

        let config = RelaytxConfig {
            rpc_url: Some("http://localhost:26657".to_owned()),
            ..Default::default()
        };
        let provider = provider(&config).unwrap();
        assert_eq!(provider.timeout(), config.timeout());
    }

    #[test]
    fn keyring_requires_key_env() {
        let config = RelaytxConfig {
            key_env: "RELAYTX_TEST_KEY_THAT_IS_NOT_SET".to_owned(),
            ..Default::default()
        };
        let err = keyring(&config, "relayer").unwrap_err();
        assert!(err.to_string().contains("RELAYTX_TEST_KEY_THAT_IS_NOT_SET"));
    }
}
