//! Attaching keyring signatures to a draft.
use relaytx_core::{
    encoding::EncodingError,
    types::{
        transaction::{SignDoc, SignedTx, UnsignedTx},
        Address, Signature,
    },
};
use relaytx_signers::{Keyring, KeyringError};
use thiserror::Error;
use tracing::{debug, trace};

/// An error collecting the signatures of a draft.
#[derive(Debug, Error)]
pub enum SignError {
    /// The keyring has no identity under the name
    #[error("signing identity {0:?} not found")]
    IdentityNotFound(String),
    /// The keyring could not produce a signature
    #[error("signing with identity {name:?} failed: {reason}")]
    SigningFailed {
        /// Name of the identity
        name: String,
        /// Reported cause
        reason: String,
    },
    /// The identity is not the signer required at the position
    #[error("identity {name:?} ({got}) cannot sign position {position}, which requires {expected}")]
    SignerMismatch {
        /// Name of the identity
        name: String,
        /// Position among the required signers
        position: usize,
        /// Address required at the position
        expected: Address,
        /// Address of the identity
        got: Address,
    },
    /// The draft has no signer at the position
    #[error("draft has no signer at position {position} ({num_signers} required)")]
    UnknownPosition {
        /// Requested position
        position: usize,
        /// Number of required signers of the draft
        num_signers: usize,
    },
    /// Finalized before every required signer signed
    #[error("missing signatures for signer positions {missing:?}")]
    IncompleteSignerSet {
        /// Positions without a signature
        missing: Vec<usize>,
    },
    /// The signed envelope could not be assembled
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

impl SignError {
    pub(crate) fn from_keyring(name: &str, err: KeyringError) -> Self {
        match err {
            KeyringError::NotFound(name) => SignError::IdentityNotFound(name),
            KeyringError::SigningFailed { name, reason } => {
                SignError::SigningFailed { name, reason }
            }
            other => SignError::SigningFailed { name: name.to_owned(), reason: other.to_string() },
        }
    }
}

/// Collects one signature per required signer of a draft.
///
/// The draft is only borrowed: signing never mutates it, and a session that is
/// dropped before [`SigningSession::finalize`] leaves nothing behind.
#[derive(Debug)]
pub struct SigningSession<'a> {
    draft: &'a UnsignedTx,
    signers: Vec<Address>,
    sign_docs: Vec<SignDoc>,
    signatures: Vec<Option<Signature>>,
}

impl<'a> SigningSession<'a> {
    pub fn new(draft: &'a UnsignedTx) -> Self {
        let signers: Vec<Address> = draft.signers().cloned().collect();
        let sign_docs = draft.sign_docs();
        let signatures = vec![None; signers.len()];
        Self { draft, signers, sign_docs, signatures }
    }

    /// The draft being signed
    pub fn draft(&self) -> &UnsignedTx {
        self.draft
    }

    /// The bytes the signer at `position` must sign
    pub fn sign_bytes(&self, position: usize) -> Result<Vec<u8>, SignError> {
        let doc = self.sign_docs.get(position).ok_or(SignError::UnknownPosition {
            position,
            num_signers: self.signers.len(),
        })?;
        Ok(doc.encode().to_vec())
    }

    /// Signs position `position` with the keyring identity `name`.
    ///
    /// The identity's address must equal the signer required at that position.
    pub async fn sign_position<K>(
        &mut self,
        position: usize,
        keyring: &K,
        name: &str,
    ) -> Result<(), SignError>
    where
        K: Keyring + ?Sized,
    {
        let expected = self
            .signers
            .get(position)
            .cloned()
            .ok_or(SignError::UnknownPosition { position, num_signers: self.signers.len() })?;

        let identity =
            keyring.identity(name).await.map_err(|err| SignError::from_keyring(name, err))?;
        if identity.address != expected {
            return Err(SignError::SignerMismatch {
                name: name.to_owned(),
                position,
                expected,
                got: identity.address,
            })
        }

        let bytes = self.sign_bytes(position)?;
        trace!(position, len = bytes.len(), "requesting signature");
        let signature =
            keyring.sign_bytes(name, &bytes).await.map_err(|err| SignError::from_keyring(name, err))?;
        debug!(position, signer = %expected, "signature attached");
        self.signatures[position] = Some(signature);
        Ok(())
    }

    /// Signs every position whose required signer is the identity `name`,
    /// returning how many were signed.
    ///
    /// Fails with [`SignError::SignerMismatch`] if the identity signs none of them.
    pub async fn sign_as<K>(&mut self, keyring: &K, name: &str) -> Result<usize, SignError>
    where
        K: Keyring + ?Sized,
    {
        let identity =
            keyring.identity(name).await.map_err(|err| SignError::from_keyring(name, err))?;
        let positions: Vec<usize> = self
            .signers
            .iter()
            .enumerate()
            .filter(|(_, signer)| **signer == identity.address)
            .map(|(position, _)| position)
            .collect();

        if positions.is_empty() {
            let expected = self.signers.first().cloned().ok_or(SignError::UnknownPosition {
                position: 0,
                num_signers: 0,
            })?;
            return Err(SignError::SignerMismatch {
                name: name.to_owned(),
                position: 0,
                expected,
                got: identity.address,
            })
        }

        for &position in &positions {
            self.sign_position(position, keyring, name).await?;
        }
        Ok(positions.len())
    }

    /// Attaches a signature produced outside of a keyring
    pub fn attach(&mut self, position: usize, signature: Signature) -> Result<(), SignError> {
        let num_signers = self.signers.len();
        let slot = self
            .signatures
            .get_mut(position)
            .ok_or(SignError::UnknownPosition { position, num_signers })?;
        *slot = Some(signature);
        Ok(())
    }

    /// Positions that have no signature yet
    pub fn missing(&self) -> Vec<usize> {
        self.signatures
            .iter()
            .enumerate()
            .filter(|(_, sig)| sig.is_none())
            .map(|(position, _)| position)
            .collect()
    }

    /// Produces the signed transaction once every required signer has signed.
    pub fn finalize(self) -> Result<SignedTx, SignError> {
        let missing = self.missing();
        if !missing.is_empty() {
            return Err(SignError::IncompleteSignerSet { missing })
        }
        let signatures = self.signatures.into_iter().flatten().collect();
        Ok(SignedTx::from_parts(self.draft, signatures)?)
    }
}

/// Signs `draft` positionally: `names[i]` signs for the `i`-th required signer.
///
/// Fewer names than required signers fails with
/// [`SignError::IncompleteSignerSet`].
pub async fn sign_tx<K>(draft: &UnsignedTx, keyring: &K, names: &[&str]) -> Result<SignedTx, SignError>
where
    K: Keyring + ?Sized,
{
    let mut session = SigningSession::new(draft);
    for (position, name) in names.iter().enumerate() {
        session.sign_position(position, keyring, name).await?;
    }
    session.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{block_hashes_msg, FixedKeyring, TEST_KEY};
    use relaytx_core::types::{transaction::TxBuilder, AccountMeta};
    use relaytx_signers::MemoryKeyring;

    fn keyring() -> (MemoryKeyring, Address) {
        let keyring = MemoryKeyring::new();
        let identity = keyring.import_hex("k1", TEST_KEY, "goat").unwrap();
        (keyring, identity.address)
    }

    fn draft(signer: &Address) -> UnsignedTx {
        TxBuilder::new("chain-1")
            .message(&block_hashes_msg(signer.as_str(), 100))
            .gas_limit(200_000)
            .fee("1000denom".parse().unwrap())
            .account(AccountMeta::new(5, 10))
            .build_unsigned()
            .unwrap()
    }

    #[tokio::test]
    async fn signs_single_signer_draft() {
        let (keyring, address) = keyring();
        let identity = keyring.identity("k1").await.unwrap();
        let draft = draft(&address);

        let signed = sign_tx(&draft, &keyring, &["k1"]).await.unwrap();
        assert_eq!(signed.signatures().len(), 1);

        // the signature covers exactly the draft's sign doc
        let sign_bytes = draft.sign_doc(0).unwrap().encode();
        signed.signatures()[0].verify(&sign_bytes, &identity.public_key).unwrap();
        assert_eq!(signed.body_bytes(), &draft.body_bytes());
        assert_eq!(signed.auth_info_bytes(), &draft.auth_info_bytes());
    }

    #[tokio::test]
    async fn missing_identity_is_reported() {
        let (keyring, address) = keyring();
        let draft = draft(&address);
        let err = sign_tx(&draft, &keyring, &["nope"]).await.unwrap_err();
        assert!(matches!(err, SignError::IdentityNotFound(name) if name == "nope"));
    }

    #[tokio::test]
    async fn wrong_identity_is_a_mismatch() {
        let (keyring, _) = keyring();
        let draft = draft(&"goat1someoneelse".parse().unwrap());
        let err = sign_tx(&draft, &keyring, &["k1"]).await.unwrap_err();
        assert!(matches!(err, SignError::SignerMismatch { position: 0, .. }));
    }

    #[tokio::test]
    async fn signing_failure_is_surfaced() {
        let keyring = FixedKeyring::new("k1", "addr1").failing();
        let draft = draft(&"addr1".parse().unwrap());
        let err = sign_tx(&draft, &keyring, &["k1"]).await.unwrap_err();
        assert!(matches!(err, SignError::SigningFailed { name, .. } if name == "k1"));
    }

    #[tokio::test]
    async fn finalize_requires_every_signer() {
        let first = FixedKeyring::new("a", "addr1");
        let draft = TxBuilder::new("chain-1")
            .message(&block_hashes_msg("addr1", 1))
            .message(&block_hashes_msg("addr2", 2))
            .gas_limit(200_000)
            .signer_account("addr1".parse().unwrap(), AccountMeta::new(1, 0))
            .signer_account("addr2".parse().unwrap(), AccountMeta::new(2, 0))
            .build_unsigned()
            .unwrap();

        let err = sign_tx(&draft, &first, &["a"]).await.unwrap_err();
        assert!(matches!(err, SignError::IncompleteSignerSet { missing } if missing == vec![1]));

        let mut session = SigningSession::new(&draft);
        assert_eq!(session.sign_as(&first, "a").await.unwrap(), 1);
        assert_eq!(session.missing(), vec![1]);
        session.attach(1, Signature::from([7u8; 64])).unwrap();
        let signed = session.finalize().unwrap();
        assert_eq!(signed.signatures().len(), 2);
        assert_eq!(signed.signatures()[1], Signature::from([7u8; 64]));
    }

    #[tokio::test]
    async fn out_of_range_positions_are_rejected() {
        let keyring = FixedKeyring::new("k1", "addr1");
        let draft = draft(&"addr1".parse().unwrap());
        let err = sign_tx(&draft, &keyring, &["k1", "k1"]).await.unwrap_err();
        assert!(matches!(err, SignError::UnknownPosition { position: 1, num_signers: 1 }));
    }

    #[tokio::test]
    async fn signing_does_not_touch_the_draft() {
        let keyring = FixedKeyring::new("k1", "addr1");
        let draft = draft(&"addr1".parse().unwrap());
        let before = draft.sign_doc(0).unwrap().encode();
        let signed = sign_tx(&draft, &keyring, &["k1"]).await.unwrap();
        assert_eq!(draft.sign_doc(0).unwrap().encode(), before);
        assert_eq!(keyring.signed(), vec![before.to_vec()]);
        assert_eq!(signed.sign_doc("chain-1", 5).encode(), draft.sign_doc(0).unwrap().encode());
    }
}
