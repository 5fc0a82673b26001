#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]
//! # relaytx pipeline
//!
//! Ties the capabilities of the other crates into one linear pipeline:
//!
//! 1. resolve the account number and sequence of every required signer
//!    ([`AccountRetriever`](relaytx_providers::AccountRetriever)),
//! 2. build the unsigned draft ([`TxBuilder`](relaytx_core::types::TxBuilder)),
//! 3. sign it with a named keyring identity ([`SigningSession`]),
//! 4. submit it exactly once ([`TxSubmitter`](relaytx_providers::TxSubmitter)).
//!
//! [`TxClient`] runs all four stages, or any one of them, from a [`TxConfig`].
//! Every failure is a [`PipelineError`], classified by [`ErrorKind`].

/// Collecting signatures for a draft
pub mod signer;
pub use signer::{sign_tx, SignError, SigningSession};

mod client;
pub use client::{TxClient, TxConfig, DEFAULT_GAS_LIMIT};

mod error;
pub use error::{ErrorKind, PipelineError};
