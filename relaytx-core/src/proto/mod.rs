//! Protobuf wire messages.
//!
//! These mirror the ledger's `.proto` definitions field for field and carry no
//! invariants of their own. The domain types in [`crate::types`] convert to and
//! from them; only the conversions check anything.
//!
//! Unknown fields are dropped by the decoder, which is why
//! [`decode_canonical`](crate::encoding::decode_canonical) re-encodes what it
//! decoded and compares.

mod goat;
pub use goat::{MsgNewBlockHashes, Votes};

mod tx;
pub use tx::{
    mode_info, AuthInfo, Coin, Fee, ModeInfo, PubKey, SignDoc, SignMode, SignerInfo, TxBody,
    TxRaw,
};

/// `google.protobuf.Any`
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct Any {
    #[prost(string, tag = "1")]
    pub type_url: String,
    #[prost(bytes = "vec", tag = "2")]
    pub value: Vec<u8>,
}
