#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]
//! # Clients for talking to a ledger node
//!
//! This crate provides an asynchronous JSON-RPC [`Provider`] and the two narrow
//! capabilities the transaction pipeline needs from the network:
//!
//! - [`AccountRetriever`]: resolve an address to its account number and sequence
//! - [`TxSubmitter`]: broadcast a signed transaction and interpret the acknowledgment
//!
//! # Examples
//!
//! ```no_run
//! use relaytx_core::types::Address;
//! use relaytx_providers::{AccountRetriever, Http, Provider};
//! use std::{convert::TryFrom, time::Duration};
//!
//! # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = Provider::<Http>::try_from("http://localhost:26657")?
//!     .with_timeout(Duration::from_secs(10));
//!
//! let account = provider.resolve(&Address::new("goat1proposer")?).await?;
//! println!("account {} at sequence {}", account.account_number, account.sequence);
//! # Ok(())
//! # }
//! ```
mod transports;
pub use transports::*;

mod errors;
pub use errors::{ProviderError, RpcError};

mod provider;
pub use provider::Provider;

mod account;
pub use account::{AccountResponse, AccountRetriever, ResolveError};

mod submit;
pub use submit::{BroadcastResponse, SubmitError, TxSubmitter, SEQUENCE_MISMATCH_CODE};

use async_trait::async_trait;
use auto_impl::auto_impl;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;

#[async_trait]
#[auto_impl(&, Box, Arc)]
/// Trait which must be implemented by data transports to be used with the JSON-RPC
/// provider.
pub trait JsonRpcClient: Debug + Send + Sync {
    /// A JSON-RPC Error
    type Error: Into<ProviderError> + RpcError;

    /// Sends a request with the provided JSON-RPC and parameters serialized as JSON
    async fn request<T, R>(&self, method: &str, params: T) -> Result<R, Self::Error>
    where
        T: Debug + Serialize + Send + Sync,
        R: DeserializeOwned + Send;
}
