use k256::ecdsa::{
    signature::Verifier, Error as K256SignatureError, Signature as K256Signature, VerifyingKey,
};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Length of a compact `r || s` secp256k1 signature.
pub const SIGNATURE_LENGTH: usize = 64;

/// An error involving a signature.
#[derive(Debug, Error)]
pub enum SignatureError {
    /// Invalid length, compact secp256k1 signatures are 64 bytes
    #[error("invalid signature length, got {0}, expected 64")]
    InvalidLength(usize),
    /// When parsing a signature from string to hex
    #[error(transparent)]
    DecodingError(#[from] hex::FromHexError),
    /// The public key is not a valid SEC1 encoded secp256k1 point
    #[error("invalid public key")]
    InvalidPublicKey,
    /// Thrown when the signature does not verify against the given key and message
    #[error("signature verification failed")]
    VerificationError,
    /// Internal k256 error
    #[error(transparent)]
    K256Error(#[from] K256SignatureError),
}

/// A compact secp256k1 ECDSA signature over `sha256(message)`, low-S normalized.
///
/// This is the raw 64-byte `r || s` form the ledger expects inside a transaction.
/// There is no recovery id: the signer's public key travels separately.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; SIGNATURE_LENGTH]);

impl Signature {
    /// Verifies that `message` was signed by the holder of `public_key`
    /// (a SEC1 encoded point, compressed or not).
    pub fn verify(&self, message: &[u8], public_key: &[u8]) -> Result<(), SignatureError> {
        let key =
            VerifyingKey::from_sec1_bytes(public_key).map_err(|_| SignatureError::InvalidPublicKey)?;
        let sig = K256Signature::from_slice(&self.0)?;
        key.verify(message, &sig).map_err(|_| SignatureError::VerificationError)
    }

    /// Returns the raw signature bytes
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.0
    }

    /// Copies the signature into a vector
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

impl From<K256Signature> for Signature {
    fn from(sig: K256Signature) -> Self {
        let sig = sig.normalize_s().unwrap_or(sig);
        let mut out = [0u8; SIGNATURE_LENGTH];
        out.copy_from_slice(&sig.to_bytes());
        Self(out)
    }
}

impl From<[u8; SIGNATURE_LENGTH]> for Signature {
    fn from(bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl<'a> TryFrom<&'a [u8]> for Signature {
    type Error = SignatureError;

    /// Parses a raw signature which is expected to be 64 bytes long
    fn try_from(bytes: &'a [u8]) -> Result<Self, Self::Error> {
        let raw: [u8; SIGNATURE_LENGTH] =
            bytes.try_into().map_err(|_| SignatureError::InvalidLength(bytes.len()))?;
        Ok(Self(raw))
    }
}

impl From<Signature> for Vec<u8> {
    fn from(sig: Signature) -> Self {
        sig.to_vec()
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for Signature {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s)?;
        Signature::try_from(&bytes[..])
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", hex::encode(self.0))
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}
