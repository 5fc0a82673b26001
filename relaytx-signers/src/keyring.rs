//! Named signing identities.
use crate::{LocalWallet, Signer, WalletError};
use async_trait::async_trait;
use auto_impl::auto_impl;
use relaytx_core::{
    k256::ecdsa::SigningKey,
    rand::thread_rng,
    types::{Address, Signature},
};
use std::{
    collections::BTreeMap,
    fmt::Debug,
    sync::{PoisonError, RwLock},
};
use thiserror::Error;
use tracing::{debug, trace};

/// An error thrown by a [`Keyring`].
#[derive(Debug, Error)]
pub enum KeyringError {
    /// No identity is registered under the name
    #[error("signing identity {0:?} not found")]
    NotFound(String),
    /// The identity exists but could not produce a signature
    #[error("signing with identity {name:?} failed: {reason}")]
    SigningFailed {
        /// Name of the identity
        name: String,
        /// Underlying failure, without key material
        reason: String,
    },
    /// An identity with the name already exists
    #[error("signing identity {0:?} already exists")]
    AlreadyExists(String),
    /// The key material could not be loaded
    #[error(transparent)]
    WalletError(#[from] WalletError),
}

/// The public half of a named signing identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub address: Address,
    /// Compressed SEC1 public key
    pub public_key: Vec<u8>,
}

/// A set of named signing identities.
///
/// The keyring never hands out key material: callers look up an identity to learn
/// its address and ask the keyring to sign bytes on its behalf.
#[async_trait]
#[auto_impl(&, Box, Arc)]
pub trait Keyring: Debug + Send + Sync {
    /// Looks up the identity registered under `name`
    async fn identity(&self, name: &str) -> Result<Identity, KeyringError>;

    /// Signs `sha256(bytes)` with the identity registered under `name`
    async fn sign_bytes(&self, name: &str, bytes: &[u8]) -> Result<Signature, KeyringError>;
}

/// An in-memory [`Keyring`] of local wallets.
///
/// Safe to share between concurrent pipelines; lookups and signing take a read
/// lock and never hold it across an await point.
#[derive(Default)]
pub struct MemoryKeyring {
    wallets: RwLock<BTreeMap<String, LocalWallet>>,
}

impl MemoryKeyring {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a wallet under `name`
    pub fn insert<T: Into<String>>(&self, name: T, wallet: LocalWallet) -> Result<Identity, KeyringError> {
        let name = name.into();
        let mut wallets = self.wallets.write().unwrap_or_else(PoisonError::into_inner);
        if wallets.contains_key(&name) {
            return Err(KeyringError::AlreadyExists(name))
        }
        let identity = identity_of(&name, &wallet);
        debug!(name = %name, address = %identity.address, "added signing identity");
        wallets.insert(name, wallet);
        Ok(identity)
    }

    /// Registers a hex encoded private key under `name`, deriving its address with `prefix`
    pub fn import_hex<T: Into<String>>(
        &self,
        name: T,
        private_key: &str,
        prefix: &str,
    ) -> Result<Identity, KeyringError> {
        let wallet = private_key.parse::<LocalWallet>()?.with_prefix(prefix)?;
        self.insert(name, wallet)
    }

    /// Generates a fresh random key under `name`
    pub fn generate<T: Into<String>>(&self, name: T, prefix: &str) -> Result<Identity, KeyringError> {
        let wallet = LocalWallet::from_signing_key(SigningKey::random(&mut thread_rng()), prefix)?;
        self.insert(name, wallet)
    }

    /// Removes the identity registered under `name`
    pub fn remove(&self, name: &str) -> Result<Identity, KeyringError> {
        let mut wallets = self.wallets.write().unwrap_or_else(PoisonError::into_inner);
        let wallet = wallets.remove(name).ok_or_else(|| KeyringError::NotFound(name.to_owned()))?;
        Ok(identity_of(name, &wallet))
    }

    /// Registered identity names, sorted
    pub fn names(&self) -> Vec<String> {
        self.wallets.read().unwrap_or_else(PoisonError::into_inner).keys().cloned().collect()
    }
}

fn identity_of(name: &str, wallet: &LocalWallet) -> Identity {
    Identity {
        name: name.to_owned(),
        address: wallet.address().clone(),
        public_key: Signer::public_key(wallet),
    }
}

#[async_trait]
impl Keyring for MemoryKeyring {
    async fn identity(&self, name: &str) -> Result<Identity, KeyringError> {
        let wallets = self.wallets.read().unwrap_or_else(PoisonError::into_inner);
        let wallet = wallets.get(name).ok_or_else(|| KeyringError::NotFound(name.to_owned()))?;
        Ok(identity_of(name, wallet))
    }

    async fn sign_bytes(&self, name: &str, bytes: &[u8]) -> Result<Signature, KeyringError> {
        let wallets = self.wallets.read().unwrap_or_else(PoisonError::into_inner);
        let wallet = wallets.get(name).ok_or_else(|| KeyringError::NotFound(name.to_owned()))?;
        trace!(name, len = bytes.len(), "signing bytes");
        wallet
            .sign_raw(bytes)
            .map_err(|err| KeyringError::SigningFailed { name: name.to_owned(), reason: err.to_string() })
    }
}

// do not log the keys
impl Debug for MemoryKeyring {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryKeyring").field("names", &self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const KEY: &str = "dcf2cbdd171a21c480aa7f53d77f31bb102282b3ff099c78e3118b37348c72f7";

    #[tokio::test]
    async fn signs_with_named_identity() {
        let keyring = MemoryKeyring::new();
        let imported = keyring.import_hex("k1", KEY, "goat").unwrap();

        let identity = keyring.identity("k1").await.unwrap();
        assert_eq!(identity, imported);
        assert!(identity.address.as_str().starts_with("goat1"));

        let sig = keyring.sign_bytes("k1", b"payload").await.unwrap();
        sig.verify(b"payload", &identity.public_key).unwrap();
    }

    #[tokio::test]
    async fn unknown_identity_is_not_found() {
        let keyring = MemoryKeyring::new();
        assert!(matches!(keyring.identity("nope").await, Err(KeyringError::NotFound(_))));
        assert!(matches!(keyring.sign_bytes("nope", b"x").await, Err(KeyringError::NotFound(_))));
        assert!(matches!(keyring.remove("nope"), Err(KeyringError::NotFound(_))));
    }

    #[tokio::test]
    async fn manages_identities() {
        let keyring = MemoryKeyring::new();
        keyring.generate("b", "goat").unwrap();
        keyring.import_hex("a", KEY, "goat").unwrap();
        assert!(matches!(keyring.generate("a", "goat"), Err(KeyringError::AlreadyExists(_))));
        assert!(matches!(keyring.import_hex("c", "zz", "goat"), Err(KeyringError::WalletError(_))));
        assert_eq!(keyring.names(), vec!["a".to_owned(), "b".to_owned()]);

        keyring.remove("a").unwrap();
        assert_eq!(keyring.names(), vec!["b".to_owned()]);
        assert!(!format!("{keyring:?}").contains(KEY));
    }

    #[tokio::test]
    async fn shared_between_tasks() {
        let keyring = Arc::new(MemoryKeyring::new());
        keyring.import_hex("k1", KEY, "goat").unwrap();

        let handles = (0..4u8).map(|i| {
            let keyring = Arc::clone(&keyring);
            tokio::spawn(async move { keyring.sign_bytes("k1", &[i]).await })
        });
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
    }
}
