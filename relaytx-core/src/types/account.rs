use serde::{Deserialize, Serialize};

/// The replay-protection state of an account at the time it was resolved.
///
/// Both numbers must still match the ledger's view when the transaction is
/// checked, otherwise the signature is rejected remotely. Nothing here can
/// detect staleness.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountMeta {
    /// Account identifier assigned by the ledger when the account was created
    pub account_number: u64,
    /// Number of transactions the account has had accepted so far
    pub sequence: u64,
}

impl AccountMeta {
    /// Creates the account state as reported by the ledger
    pub fn new(account_number: u64, sequence: u64) -> Self {
        Self { account_number, sequence }
    }
}
