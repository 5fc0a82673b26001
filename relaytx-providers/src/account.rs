use crate::{JsonRpcClient, Provider, ProviderError, RpcError};
use async_trait::async_trait;
use auto_impl::auto_impl;
use relaytx_core::types::{AccountMeta, Address};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use tracing::debug;

/// An error resolving an account's replay-protection state.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The ledger has no record of the address
    #[error("account {0} not found")]
    AccountNotFound(Address),
    /// The account state could not be read
    #[error("account resolver unavailable: {0}")]
    ResolverUnavailable(#[source] ProviderError),
}

/// Read-only access to on-chain account state.
#[async_trait]
#[auto_impl(&, Box, Arc)]
pub trait AccountRetriever: std::fmt::Debug + Send + Sync {
    /// Returns the account number and current sequence of `address`.
    ///
    /// An address the ledger has never seen is [`ResolveError::AccountNotFound`],
    /// never a zeroed [`AccountMeta`].
    async fn resolve(&self, address: &Address) -> Result<AccountMeta, ResolveError>;
}

/// The `auth_account` result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountResponse {
    pub address: Address,
    #[serde(with = "u64_string")]
    pub account_number: u64,
    #[serde(with = "u64_string")]
    pub sequence: u64,
}

impl From<AccountResponse> for AccountMeta {
    fn from(res: AccountResponse) -> Self {
        AccountMeta::new(res.account_number, res.sequence)
    }
}

#[async_trait]
impl<P: JsonRpcClient> AccountRetriever for Provider<P> {
    async fn resolve(&self, address: &Address) -> Result<AccountMeta, ResolveError> {
        let account = match self.get_account(address).await {
            Ok(account) => account,
            Err(err) if err.as_error_response().map_or(false, |e| e.is_not_found()) => None,
            Err(err) => return Err(ResolveError::ResolverUnavailable(err)),
        };
        let account = account.ok_or_else(|| ResolveError::AccountNotFound(address.clone()))?;
        if account.address != *address {
            return Err(ResolveError::ResolverUnavailable(ProviderError::CustomError(format!(
                "queried account {address} but node answered for {}",
                account.address
            ))))
        }
        debug!(%address, account_number = account.account_number, sequence = account.sequence, "resolved account");
        Ok(account.into())
    }
}

// Nodes encode 64-bit integers as JSON strings; accept plain numbers too.
mod u64_string {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(u64),
        String(String),
    }

    pub(super) fn serialize<S: Serializer>(value: &u64, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_string())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        match Repr::deserialize(d)? {
            Repr::Number(n) => Ok(n),
            Repr::String(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{JsonRpcError, MockResponse};
    use serde_json::json;

    fn address() -> Address {
        Address::new("goat1relayer").unwrap()
    }

    #[tokio::test]
    async fn resolves_account() {
        let (provider, mock) = Provider::mocked();
        mock.push(json!({ "address": "goat1relayer", "account_number": "5", "sequence": "10" }))
            .unwrap();

        let meta = provider.resolve(&address()).await.unwrap();
        assert_eq!(meta, AccountMeta::new(5, 10));
        mock.assert_request("auth_account", ["goat1relayer"]).unwrap();
    }

    #[tokio::test]
    async fn accepts_numeric_fields() {
        let (provider, mock) = Provider::mocked();
        mock.push(json!({ "address": "goat1relayer", "account_number": 5, "sequence": 0 }))
            .unwrap();
        assert_eq!(provider.resolve(&address()).await.unwrap(), AccountMeta::new(5, 0));
    }

    #[tokio::test]
    async fn missing_account_is_not_found() {
        let (provider, mock) = Provider::mocked();
        mock.push(serde_json::Value::Null).unwrap();
        mock.push_response(MockResponse::Error(JsonRpcError {
            code: -32603,
            message: "account goat1relayer not found".to_owned(),
            data: None,
        }));

        for _ in 0..2 {
            let err = provider.resolve(&address()).await.unwrap_err();
            assert!(matches!(err, ResolveError::AccountNotFound(a) if a == address()));
        }
    }

    #[tokio::test]
    async fn transport_failure_is_unavailable() {
        let (provider, mock) = Provider::mocked();
        mock.push_response(MockResponse::TransportError("connection refused".to_owned()));
        mock.push_response(MockResponse::Error(JsonRpcError {
            code: -32603,
            message: "Internal error".to_owned(),
            data: None,
        }));
        mock.push(json!({ "address": "goat1other", "account_number": "1", "sequence": "1" }))
            .unwrap();

        for _ in 0..3 {
            let err = provider.resolve(&address()).await.unwrap_err();
            assert!(matches!(err, ResolveError::ResolverUnavailable(_)));
        }
    }
}
