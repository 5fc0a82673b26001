//! Specific helper functions for loading an offline K256 Private Key
use super::Wallet;

use relaytx_core::{
    k256::{
        ecdsa::{self, SigningKey},
        elliptic_curve::sec1::ToEncodedPoint,
        SecretKey as K256SecretKey,
    },
    rand::{CryptoRng, RngCore},
    types::{Address, AddressError, DEFAULT_ADDRESS_PREFIX},
};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
/// Error thrown by the Wallet module
pub enum WalletError {
    /// Error propagated from k256's ECDSA module
    #[error(transparent)]
    EcdsaError(#[from] ecdsa::Error),
    /// Error propagated from the hex crate.
    #[error(transparent)]
    HexError(#[from] hex::FromHexError),
    /// The address could not be derived under the configured prefix
    #[error(transparent)]
    AddressError(#[from] AddressError),
}

impl Wallet<SigningKey> {
    /// Creates a new random keypair seeded with the provided RNG
    pub fn new<R: CryptoRng + RngCore>(rng: &mut R) -> Result<Self, WalletError> {
        Self::from_signing_key(SigningKey::random(rng), DEFAULT_ADDRESS_PREFIX)
    }

    /// Wraps a signing key, deriving its address under `prefix`
    pub fn from_signing_key(signer: SigningKey, prefix: &str) -> Result<Self, WalletError> {
        let public_key = signer.verifying_key().to_encoded_point(true).as_bytes().to_vec();
        let address = Address::from_public_key(prefix, &public_key)?;
        Ok(Self { signer, public_key, address, prefix: prefix.to_owned() })
    }
}

impl PartialEq for Wallet<SigningKey> {
    fn eq(&self, other: &Self) -> bool {
        self.signer.to_bytes().eq(&other.signer.to_bytes()) && self.address == other.address
    }
}

impl TryFrom<SigningKey> for Wallet<SigningKey> {
    type Error = WalletError;

    fn try_from(signer: SigningKey) -> Result<Self, Self::Error> {
        Self::from_signing_key(signer, DEFAULT_ADDRESS_PREFIX)
    }
}

impl TryFrom<K256SecretKey> for Wallet<SigningKey> {
    type Error = WalletError;

    fn try_from(key: K256SecretKey) -> Result<Self, Self::Error> {
        Self::from_signing_key(key.into(), DEFAULT_ADDRESS_PREFIX)
    }
}

impl FromStr for Wallet<SigningKey> {
    type Err = WalletError;

    fn from_str(src: &str) -> Result<Self, Self::Err> {
        let src = src.trim();
        let src = hex::decode(src.strip_prefix("0x").unwrap_or(src))?;
        let sk = SigningKey::from_slice(&src)?;
        sk.try_into()
    }
}
