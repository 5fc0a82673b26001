#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]
//! Ledger types, canonical encoding and utilities.
//!
//! This crate holds everything that can be computed without talking to a node or
//! touching key material: the relayer's typed messages, the unsigned transaction
//! draft and its builder, the signed transaction envelope and the protobuf
//! encoding that ties them together.
//!
//! ## Building a draft
//!
//! ```rust
//! use relaytx_core::types::{
//!     msg::{MsgNewBlockHashes, Votes},
//!     transaction::TxBuilder,
//!     AccountMeta,
//! };
//!
//! # fn foo() -> Result<(), Box<dyn std::error::Error>> {
//! let msg = MsgNewBlockHashes::builder()
//!     .proposer("goat1proposer")
//!     .start_block_number(100)
//!     .block_hash(b"hash1".to_vec())
//!     .block_hash(b"hash2".to_vec())
//!     .vote(Votes::new(b"signature".to_vec()))
//!     .build()?;
//!
//! let draft = TxBuilder::new("48815")
//!     .message(&msg)
//!     .gas_limit(200_000)
//!     .fee("1000ugoat".parse::<relaytx_core::types::Coin>()?)
//!     .account(AccountMeta::new(5, 10))
//!     .build_unsigned()?;
//!
//! // identical inputs always produce identical sign bytes
//! let sign_bytes = draft.sign_doc(0).expect("one signer").encode();
//! assert_eq!(sign_bytes, draft.sign_doc(0).expect("one signer").encode());
//! # Ok(())
//! # }
//! ```
//!
//! ## Encoding
//!
//! Transactions use the ledger's `cosmos.tx.v1beta1` protobuf layout and are
//! signed in `SIGN_MODE_DIRECT`, see [`encoding`]. The wire messages live in
//! [`proto`]. Changing them breaks signature verification on the remote ledger.
pub mod types;

pub mod encoding;

pub mod proto;

/// Various utilities
pub mod utils;

// re-export rand to avoid potential confusion when there's rand version mismatches
pub use rand;

// re-export k256
pub use k256;
