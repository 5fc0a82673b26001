//! Hash helpers shared by transaction hashing and address derivation.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of input bytes.
pub fn sha256<T: AsRef<[u8]>>(bytes: T) -> [u8; 32] {
    Sha256::digest(bytes.as_ref()).into()
}

/// Compute `ripemd160(sha256(bytes))`, the account identifier derived from a public key.
pub fn hash160<T: AsRef<[u8]>>(bytes: T) -> [u8; 20] {
    Ripemd160::digest(sha256(bytes)).into()
}
