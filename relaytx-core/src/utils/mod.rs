mod hash;
pub use hash::{hash160, sha256};
