//! The byte encoding shared by signing and submission.
//!
//! Transactions use the ledger's protobuf layout (`cosmos.tx.v1beta1`) and are
//! signed in `SIGN_MODE_DIRECT`: a signer signs the encoded
//! [`SignDoc`](crate::types::SignDoc), and the wire form is the encoded `TxRaw`
//! carrying the very same body and auth info bytes.
//!
//! The layout is versioned by the proto packages and type URLs it names. Fields
//! are only ever appended under new tags. Decoding is strict: the input must be
//! the canonical encoding of what was decoded, so unknown fields and reordered
//! or duplicated fields are rejected instead of silently dropped.
use crate::proto::SignMode;
use prost::{DecodeError, Message};
use thiserror::Error;

/// The only sign mode produced and accepted.
pub const SIGN_MODE: SignMode = SignMode::Direct;

/// Type URL of a secp256k1 public key inside a `SignerInfo`.
pub const PUBKEY_TYPE_URL: &str = "/cosmos.crypto.secp256k1.PubKey";

/// An error while decoding (or re-checking) encoded bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    /// The bytes are not a protobuf encoding of the expected message
    #[error("protobuf decoding failed: {0}")]
    Decode(#[from] DecodeError),
    /// The bytes decode, but re-encoding the value does not reproduce them
    #[error("input is not the canonical encoding of the decoded value")]
    NonCanonical,
    /// A decoded field violates the domain rules
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// Name of the offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
    /// A signed transaction does not carry one signature per signer
    #[error("expected {expected} signatures, got {got}")]
    SignatureCountMismatch {
        /// Required signers named in the auth info
        expected: usize,
        /// Signatures attached
        got: usize,
    },
    /// The transaction carries no messages
    #[error("transaction has no messages")]
    NoMessages,
}

impl EncodingError {
    pub(crate) fn invalid(field: &'static str, reason: impl ToString) -> Self {
        EncodingError::InvalidField { field, reason: reason.to_string() }
    }
}

/// Encodes a wire message
pub fn encode<M: Message>(msg: &M) -> Vec<u8> {
    msg.encode_to_vec()
}

/// Decodes `bytes` and checks that they are exactly the encoding of the result.
pub fn decode_canonical<M: Message + Default>(bytes: &[u8]) -> Result<M, EncodingError> {
    let msg = M::decode(bytes)?;
    if msg.encoded_len() != bytes.len() || msg.encode_to_vec() != bytes {
        return Err(EncodingError::NonCanonical)
    }
    Ok(msg)
}
