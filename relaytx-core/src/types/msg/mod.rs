//! Typed application messages and the envelope that carries them in a transaction.
use crate::{
    encoding::{decode_canonical, EncodingError},
    proto,
    types::{Address, Bytes},
};
use prost::Message;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod block_hashes;
pub use block_hashes::{MsgNewBlockHashes, MsgNewBlockHashesBuilder, Votes};

/// An error constructing or decoding a message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    /// A required payload field is missing, empty or malformed
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    /// The envelope names a different message type
    #[error("unexpected message type {got:?}, expected {expected:?}")]
    UnexpectedType {
        /// Type URL of the requested message
        expected: &'static str,
        /// Type URL found in the envelope
        got: String,
    },
    /// The envelope payload is not a valid encoding of the message
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

/// A typed message bound to exactly one signer.
///
/// Implementors are plain values: once built they are never mutated, and their
/// encoding is a pure function of their fields.
pub trait Msg: Sized {
    /// Routing identifier of the message type on the ledger
    const TYPE_URL: &'static str;

    /// The protobuf message this type travels as
    type Proto: Message + Default;

    /// The account that must sign any transaction carrying this message
    fn signer(&self) -> &Address;

    /// Checks the payload invariants. Called for every decoded message.
    fn validate(&self) -> Result<(), MessageError>;

    fn to_proto(&self) -> Self::Proto;

    /// Converts a decoded wire message, enforcing the payload invariants
    fn from_proto(proto: Self::Proto) -> Result<Self, MessageError>;

    /// The canonical encoding of the message payload
    fn encode(&self) -> Bytes {
        self.to_proto().encode_to_vec().into()
    }

    /// Wraps the message into its typed envelope
    fn to_any(&self) -> Any {
        Any { type_url: Self::TYPE_URL.to_owned(), value: self.encode() }
    }

    /// Unwraps a message of this type from an envelope
    fn from_any(any: &Any) -> Result<Self, MessageError> {
        if any.type_url != Self::TYPE_URL {
            return Err(MessageError::UnexpectedType {
                expected: Self::TYPE_URL,
                got: any.type_url.clone(),
            })
        }
        let msg = Self::from_proto(decode_canonical(&any.value)?)?;
        msg.validate()?;
        Ok(msg)
    }
}

/// A message in its envelope form: a type URL and the encoded payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Any {
    /// Type URL of the payload, e.g. `/goat.bitcoin.v1.MsgNewBlockHashes`
    pub type_url: String,
    /// Canonical encoding of the payload
    pub value: Bytes,
}

impl From<&Any> for proto::Any {
    fn from(any: &Any) -> Self {
        proto::Any { type_url: any.type_url.clone(), value: any.value.to_vec() }
    }
}

impl From<proto::Any> for Any {
    fn from(raw: proto::Any) -> Self {
        Any { type_url: raw.type_url, value: raw.value.into() }
    }
}
