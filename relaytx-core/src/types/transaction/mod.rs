//! Transaction drafts, sign documents and signed envelopes.
mod body;
pub use body::{AuthInfo, SignerInfo, TxBody};

mod builder;
pub use builder::{BuildError, TxBuilder};

mod unsigned;
pub use unsigned::{SignDoc, UnsignedTx};

mod signed;
pub use signed::SignedTx;
