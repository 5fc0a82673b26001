use super::{AuthInfo, SignDoc, TxBody, UnsignedTx};
use crate::{
    encoding::{decode_canonical, encode, EncodingError},
    proto,
    types::{Bytes, Signature, TxHash},
};
use serde::{Deserialize, Serialize};

/// A transaction with one signature per required signer, ready for the wire.
///
/// It stores the exact body and auth info bytes that were signed over, so that
/// encoding it for submission can never reorder or reformat signed content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedTx {
    body_bytes: Bytes,
    auth_info_bytes: Bytes,
    signatures: Vec<Signature>,
}

impl SignedTx {
    /// Attaches `signatures` to `draft`, signature `i` belonging to signer `i`.
    pub fn from_parts(draft: &UnsignedTx, signatures: Vec<Signature>) -> Result<Self, EncodingError> {
        if signatures.len() != draft.num_signers() {
            return Err(EncodingError::SignatureCountMismatch {
                expected: draft.num_signers(),
                got: signatures.len(),
            })
        }
        Ok(Self {
            body_bytes: draft.body_bytes(),
            auth_info_bytes: draft.auth_info_bytes(),
            signatures,
        })
    }

    /// Decodes wire bytes produced by [`SignedTx::encode`]
    pub fn decode(bytes: &[u8]) -> Result<Self, EncodingError> {
        decode_canonical::<proto::TxRaw>(bytes)?.try_into()
    }

    /// The final wire encoding, a `TxRaw`
    pub fn encode(&self) -> Bytes {
        encode(&proto::TxRaw::from(self)).into()
    }

    /// `sha256` of the wire encoding
    pub fn hash(&self) -> TxHash {
        TxHash::of(&self.encode())
    }

    pub fn body_bytes(&self) -> &Bytes {
        &self.body_bytes
    }

    pub fn auth_info_bytes(&self) -> &Bytes {
        &self.auth_info_bytes
    }

    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    pub fn body(&self) -> Result<TxBody, EncodingError> {
        Ok(decode_canonical::<proto::TxBody>(&self.body_bytes)?.into())
    }

    pub fn auth_info(&self) -> Result<AuthInfo, EncodingError> {
        decode_canonical::<proto::AuthInfo>(&self.auth_info_bytes)?.try_into()
    }

    /// Rebuilds the document a signer with `account_number` signed
    pub fn sign_doc(&self, chain_id: &str, account_number: u64) -> SignDoc {
        SignDoc {
            body_bytes: self.body_bytes.clone(),
            auth_info_bytes: self.auth_info_bytes.clone(),
            chain_id: chain_id.to_owned(),
            account_number,
        }
    }

    /// Checks that the transaction is structurally sound: both halves decode,
    /// there is at least one message and one signature per signer.
    pub fn validate(&self) -> Result<(), EncodingError> {
        let body = self.body()?;
        if body.messages.is_empty() {
            return Err(EncodingError::NoMessages)
        }
        let auth_info = self.auth_info()?;
        if auth_info.signer_infos.len() != self.signatures.len() {
            return Err(EncodingError::SignatureCountMismatch {
                expected: auth_info.signer_infos.len(),
                got: self.signatures.len(),
            })
        }
        Ok(())
    }
}

impl From<&SignedTx> for proto::TxRaw {
    fn from(tx: &SignedTx) -> Self {
        proto::TxRaw {
            body_bytes: tx.body_bytes.to_vec(),
            auth_info_bytes: tx.auth_info_bytes.to_vec(),
            signatures: tx.signatures.iter().map(Signature::to_vec).collect(),
        }
    }
}

impl TryFrom<proto::TxRaw> for SignedTx {
    type Error = EncodingError;

    fn try_from(raw: proto::TxRaw) -> Result<Self, Self::Error> {
        let signatures = raw
            .signatures
            .iter()
            .map(|sig| Signature::try_from(sig.as_slice()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| EncodingError::invalid("signatures", err))?;
        Ok(Self {
            body_bytes: raw.body_bytes.into(),
            auth_info_bytes: raw.auth_info_bytes.into(),
            signatures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        types::{
            msg::{MsgNewBlockHashes, Votes},
            transaction::TxBuilder,
            AccountMeta,
        },
    };

    fn draft() -> UnsignedTx {
        let msg = MsgNewBlockHashes::builder()
            .proposer("addr1")
            .start_block_number(100)
            .block_hash(b"h1".to_vec())
            .block_hash(b"h2".to_vec())
            .vote(Votes::new(b"sig".to_vec()))
            .build()
            .unwrap();
        TxBuilder::new("chain-1")
            .message(&msg)
            .gas_limit(200_000)
            .fee("1000denom".parse().unwrap())
            .account(AccountMeta::new(5, 10))
            .build_unsigned()
            .unwrap()
    }

    #[test]
    fn wire_bytes_carry_the_signed_bytes() {
        let draft = draft();
        let signed = SignedTx::from_parts(&draft, vec![Signature::from([9u8; 64])]).unwrap();

        let decoded = SignedTx::decode(&signed.encode()).unwrap();
        assert_eq!(decoded, signed);
        assert_eq!(decoded.sign_doc("chain-1", 5), draft.sign_doc(0).unwrap());
        assert_eq!(decoded.body().unwrap(), *draft.body());
        assert_eq!(decoded.auth_info().unwrap(), *draft.auth_info());
        decoded.validate().unwrap();
    }

    #[test]
    fn hash_is_sha256_of_wire_bytes() {
        let signed = SignedTx::from_parts(&draft(), vec![Signature::from([9u8; 64])]).unwrap();
        assert_eq!(signed.hash(), TxHash::of(&signed.encode()));
        assert_eq!(signed.hash(), signed.clone().hash());
    }

    #[test]
    fn requires_one_signature_per_signer() {
        assert_eq!(
            SignedTx::from_parts(&draft(), vec![]),
            Err(EncodingError::SignatureCountMismatch { expected: 1, got: 0 })
        );
    }

    #[test]
    fn wire_bytes_are_a_tx_raw() {
        let draft = draft();
        let signed = SignedTx::from_parts(&draft, vec![Signature::from([9u8; 64])]).unwrap();
        let bytes = signed.encode();
        // body_bytes come first, as field 1
        assert_eq!(bytes[0], 0x0a);

        let raw = decode_canonical::<proto::TxRaw>(&bytes).unwrap();
        assert_eq!(raw.body_bytes, draft.body_bytes().to_vec());
        assert_eq!(raw.auth_info_bytes, draft.auth_info_bytes().to_vec());
        assert_eq!(raw.signatures, vec![vec![9u8; 64]]);
    }

    #[test]
    fn rejects_malformed_wire_bytes() {
        let signed = SignedTx::from_parts(&draft(), vec![Signature::from([9u8; 64])]).unwrap();

        let mut unknown_field = signed.encode().to_vec();
        unknown_field.extend_from_slice(&[0x20, 0x01]);
        assert_eq!(SignedTx::decode(&unknown_field), Err(EncodingError::NonCanonical));

        let mut raw = proto::TxRaw::from(&signed);
        raw.signatures[0].truncate(63);
        assert!(matches!(
            SignedTx::decode(&encode(&raw)),
            Err(EncodingError::InvalidField { field: "signatures", .. })
        ));
    }

    #[test]
    fn validate_rejects_undecodable_halves() {
        let signed = SignedTx::from_parts(&draft(), vec![Signature::from([9u8; 64])]).unwrap();
        let mut raw = proto::TxRaw::from(&signed);
        raw.auth_info_bytes.push(0xff);
        let broken = SignedTx::decode(&encode(&raw)).unwrap();
        assert!(broken.validate().is_err());
    }
}
