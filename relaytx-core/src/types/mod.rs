mod bytes;
pub use self::bytes::{deserialize_bytes, serialize_bytes, Bytes};

mod address;
pub use address::{Address, AddressError, DEFAULT_ADDRESS_PREFIX};

mod coin;
pub use coin::{parse_coins, Coin, CoinError, Fee};

mod signature;
pub use signature::{Signature, SignatureError};

mod hash;
pub use hash::TxHash;

mod account;
pub use account::AccountMeta;

pub mod msg;
pub use msg::{Any, MessageError, Msg};

pub mod transaction;
pub use transaction::{BuildError, SignDoc, SignedTx, TxBuilder, UnsignedTx};
