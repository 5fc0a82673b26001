use crate::utils::hash160;
use bech32::{Bech32, Hrp};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Human readable part used when deriving addresses if none is configured.
pub const DEFAULT_ADDRESS_PREFIX: &str = "goat";

/// An error involving an account address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// The address was empty or only whitespace
    #[error("address is blank")]
    Blank,
    /// The address contained whitespace
    #[error("address contains whitespace: {0:?}")]
    Whitespace(String),
    /// The bech32 human readable part is not valid
    #[error("invalid address prefix {prefix:?}: {reason}")]
    InvalidPrefix {
        /// The rejected prefix
        prefix: String,
        /// Why it was rejected
        reason: String,
    },
    /// The bech32 payload could not be encoded or decoded
    #[error("invalid bech32 address: {0}")]
    Bech32(String),
}

/// An account address as the ledger sees it.
///
/// Any non-blank string without whitespace is accepted: whether the account
/// exists, or whether the string is valid bech32 for the target chain, is for the
/// remote ledger to decide. Addresses derived locally from a public key follow the
/// Cosmos rule `bech32(prefix, ripemd160(sha256(compressed_pubkey)))`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Validates and wraps an address string
    pub fn new<T: Into<String>>(address: T) -> Result<Self, AddressError> {
        let address = address.into();
        if address.trim().is_empty() {
            return Err(AddressError::Blank)
        }
        if address.chars().any(char::is_whitespace) {
            return Err(AddressError::Whitespace(address))
        }
        Ok(Self(address))
    }

    /// Derives the bech32 account address of a compressed secp256k1 public key
    pub fn from_public_key(prefix: &str, public_key: &[u8]) -> Result<Self, AddressError> {
        let hrp = Hrp::parse(prefix).map_err(|err| AddressError::InvalidPrefix {
            prefix: prefix.to_owned(),
            reason: err.to_string(),
        })?;
        let encoded = bech32::encode::<Bech32>(hrp, &hash160(public_key))
            .map_err(|err| AddressError::Bech32(err.to_string()))?;
        Ok(Self(encoded))
    }

    /// Decodes the address as bech32, returning its prefix and payload
    pub fn decode_bech32(&self) -> Result<(String, Vec<u8>), AddressError> {
        let (hrp, data) =
            bech32::decode(&self.0).map_err(|err| AddressError::Bech32(err.to_string()))?;
        Ok((hrp.to_string(), data))
    }

    /// Returns the address as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Address {
    type Error = AddressError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_addresses() {
        assert_eq!(Address::new(""), Err(AddressError::Blank));
        assert_eq!(Address::new("   "), Err(AddressError::Blank));
        assert!(matches!(Address::new("goat1 abc"), Err(AddressError::Whitespace(_))));
        assert_eq!(Address::new("addr1").unwrap().as_str(), "addr1");
    }

    #[test]
    fn derives_bech32_address() {
        let public_key = [2u8; 33];
        let address = Address::from_public_key("goat", &public_key).unwrap();
        assert!(address.as_str().starts_with("goat1"));

        let (prefix, payload) = address.decode_bech32().unwrap();
        assert_eq!(prefix, "goat");
        assert_eq!(payload, hash160(public_key).to_vec());

        // a different prefix changes the encoding but not the payload
        let cosmos = Address::from_public_key("cosmos", &public_key).unwrap();
        assert_ne!(address, cosmos);
        assert_eq!(cosmos.decode_bech32().unwrap().1, payload);
    }

    #[test]
    fn rejects_invalid_prefix() {
        assert!(matches!(
            Address::from_public_key("", &[2u8; 33]),
            Err(AddressError::InvalidPrefix { .. })
        ));
    }

    #[test]
    fn serde_roundtrip_validates() {
        let address: Address = serde_json::from_str(r#""goat1xyz""#).unwrap();
        assert_eq!(address.as_str(), "goat1xyz");
        assert!(serde_json::from_str::<Address>(r#""""#).is_err());
    }
}
