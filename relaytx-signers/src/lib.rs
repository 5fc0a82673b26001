#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]
//! Provides a unified interface for signing transaction bytes.
//!
//! You can implement the [`Signer`] trait to extend functionality to other signers
//! such as Hardware Security Modules, KMS etc. The [`Keyring`] trait is the named,
//! shareable view over a set of signing identities that the transaction pipeline
//! consumes.
//!
//! Signatures are compact secp256k1 ECDSA over `sha256(bytes)`, see
//! [`Signature`](relaytx_core::types::Signature).
//!
//! ```
//! use relaytx_signers::{LocalWallet, Signer};
//!
//! # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
//! let wallet = "dcf2cbdd171a21c480aa7f53d77f31bb102282b3ff099c78e3118b37348c72f7"
//!     .parse::<LocalWallet>()?;
//!
//! let signature = wallet.sign_bytes(b"hello world").await?;
//! signature.verify(b"hello world", &wallet.public_key())?;
//! assert!(wallet.address().as_str().starts_with("goat1"));
//! # Ok(())
//! # }
//! ```
mod wallet;
pub use wallet::{Wallet, WalletError};

mod keyring;
pub use keyring::{Identity, Keyring, KeyringError, MemoryKeyring};

/// A wallet instantiated with a locally stored private key
pub type LocalWallet = Wallet<relaytx_core::k256::ecdsa::SigningKey>;

use async_trait::async_trait;
use relaytx_core::types::{Address, SignDoc, Signature};
use std::error::Error;

/// Trait for signing transaction bytes
///
/// Implement this trait to support different signing modes, e.g. Ledger, hosted etc.
#[async_trait]
pub trait Signer: std::fmt::Debug + Send + Sync {
    type Error: Error + Send + Sync;

    /// Signs `sha256(message)`
    async fn sign_bytes<S: Send + Sync + AsRef<[u8]>>(
        &self,
        message: S,
    ) -> Result<Signature, Self::Error>;

    /// Signs the encoding of a sign document
    async fn sign_doc(&self, doc: &SignDoc) -> Result<Signature, Self::Error> {
        self.sign_bytes(doc.encode()).await
    }

    /// Returns the signer's account address
    fn address(&self) -> Address;

    /// Returns the signer's compressed SEC1 public key
    fn public_key(&self) -> Vec<u8>;
}
