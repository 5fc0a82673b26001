#![warn(missing_debug_implementations, rust_2018_idioms, unreachable_pub)]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_cfg))]
//! # relaytx
//!
//! Builds relayer messages, wraps them in transactions, signs them with a named
//! keyring identity and broadcasts them to a Cosmos-style ledger over JSON-RPC.
//!
//! The crates are re-exported as modules:
//!
//! - [`core`]: messages, the transaction draft, the signed envelope and their
//!   protobuf encoding. Pure, no I/O.
//! - [`signers`]: local wallets and the [`Keyring`](signers::Keyring) capability.
//! - [`providers`]: the JSON-RPC transports, account resolution and submission.
//! - [`middleware`]: the [`TxClient`](middleware::TxClient) pipeline.
//!
//! # Quickstart
//!
//! ```no_run
//! use relaytx::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = Arc::new(Provider::<Http>::try_from("http://localhost:26657")?);
//!
//! let keyring = MemoryKeyring::new();
//! let relayer = keyring.import_hex(
//!     "relayer",
//!     "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318",
//!     "goat",
//! )?;
//!
//! let config = TxConfig::new("48815", "relayer").fees("1000ugoat")?;
//! let client = TxClient::new(provider.clone(), provider, keyring, config);
//!
//! let msg = MsgNewBlockHashes::builder()
//!     .proposer(relayer.address.as_str())
//!     .start_block_number(100)
//!     .block_hash(vec![0xab; 32])
//!     .vote(Votes::new(vec![1u8; 48]))
//!     .build()?;
//!
//! match client.send(&[msg]).await {
//!     Ok(tx_hash) => println!("accepted {tx_hash}"),
//!     Err(err) if err.is_retryable() => println!("try again later: {err}"),
//!     Err(err) => println!("{}: {err}", err.kind()),
//! }
//! # Ok(())
//! # }
//! ```

#[doc(inline)]
pub use relaytx_core as core;

#[doc(inline)]
pub use relaytx_signers as signers;

#[doc(inline)]
pub use relaytx_providers as providers;

#[doc(inline)]
pub use relaytx_middleware as middleware;

/// Easy imports of frequently used type definitions and traits
pub mod prelude {
    pub use super::core::types::{
        msg::{Any, Msg, MsgNewBlockHashes, Votes},
        transaction::{SignDoc, SignedTx, TxBuilder, UnsignedTx},
        AccountMeta, Address, Coin, Signature, TxHash,
    };

    pub use super::middleware::{
        sign_tx, ErrorKind, PipelineError, SigningSession, TxClient, TxConfig,
    };

    pub use super::providers::{
        AccountRetriever, Http, MockProvider, Provider, ProviderError, SubmitError, TxSubmitter,
    };

    pub use super::signers::{Identity, Keyring, LocalWallet, MemoryKeyring, Signer};
}
