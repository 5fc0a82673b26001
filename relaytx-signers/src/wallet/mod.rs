mod private_key;
pub use private_key::WalletError;

use crate::Signer;
use relaytx_core::{
    k256::ecdsa::{signature::Signer as EcdsaSigner, Signature as K256Signature},
    types::{Address, Signature},
};

use async_trait::async_trait;
use std::fmt;

/// A secp256k1 private-public key pair bound to a bech32 account address.
///
/// # Examples
///
/// ## Signing and Verifying bytes
///
/// ```
/// use relaytx_core::rand::thread_rng;
/// use relaytx_signers::{LocalWallet, Signer};
///
/// # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
/// let wallet = LocalWallet::new(&mut thread_rng())?;
///
/// // Addresses use the `goat` prefix unless told otherwise
/// let wallet = wallet.with_prefix("cosmos")?;
///
/// let message = b"hello";
/// let signature = wallet.sign_bytes(message).await?;
/// signature.verify(message, &wallet.public_key())?;
/// # Ok(())
/// # }
/// ```
pub struct Wallet<D: EcdsaSigner<K256Signature>> {
    /// The Wallet's private Key
    pub(crate) signer: D,
    /// Compressed SEC1 encoding of the public key
    pub(crate) public_key: Vec<u8>,
    /// The wallet's address, derived from `public_key` and `prefix`
    pub(crate) address: Address,
    /// Bech32 human readable part of the address
    pub(crate) prefix: String,
}

#[async_trait]
impl<D: Sync + Send + EcdsaSigner<K256Signature>> Signer for Wallet<D> {
    type Error = WalletError;

    async fn sign_bytes<S: Send + Sync + AsRef<[u8]>>(
        &self,
        message: S,
    ) -> Result<Signature, Self::Error> {
        self.sign_raw(message.as_ref())
    }

    fn address(&self) -> Address {
        self.address.clone()
    }

    fn public_key(&self) -> Vec<u8> {
        self.public_key.clone()
    }
}

impl<D: EcdsaSigner<K256Signature>> Wallet<D> {
    /// Signs `sha256(message)` synchronously, normalizing to low-S
    pub fn sign_raw(&self, message: &[u8]) -> Result<Signature, WalletError> {
        let sig: K256Signature = self.signer.try_sign(message)?;
        Ok(sig.into())
    }

    /// Re-derives the wallet's address under another bech32 prefix
    pub fn with_prefix<T: Into<String>>(mut self, prefix: T) -> Result<Self, WalletError> {
        let prefix = prefix.into();
        self.address = Address::from_public_key(&prefix, &self.public_key)?;
        self.prefix = prefix;
        Ok(self)
    }

    /// Gets the wallet's address prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the wallet's address
    pub fn address(&self) -> &Address {
        &self.address
    }
}

// do not log the signer
impl<D: EcdsaSigner<K256Signature>> fmt::Debug for Wallet<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .field("public_key", &hex::encode(&self.public_key))
            .finish()
    }
}
