use super::{AuthInfo, TxBody};
use crate::{
    encoding::{decode_canonical, encode, EncodingError},
    proto,
    types::{Address, Bytes},
};
use serde::{Deserialize, Serialize};

/// A transaction awaiting signatures.
///
/// Produced by [`TxBuilder`](super::TxBuilder). Its content cannot be modified;
/// signing produces a separate [`SignedTx`](super::SignedTx) and leaves the draft
/// untouched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedTx {
    body: TxBody,
    auth_info: AuthInfo,
    chain_id: String,
    signers: Vec<Address>,
    account_numbers: Vec<u64>,
}

impl UnsignedTx {
    pub(super) fn new(
        body: TxBody,
        auth_info: AuthInfo,
        chain_id: String,
        signers: Vec<Address>,
        account_numbers: Vec<u64>,
    ) -> Self {
        Self { body, auth_info, chain_id, signers, account_numbers }
    }

    /// The messages with memo and timeout height
    pub fn body(&self) -> &TxBody {
        &self.body
    }

    /// Signer infos and fee
    pub fn auth_info(&self) -> &AuthInfo {
        &self.auth_info
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    /// Account numbers of the required signers, in signer order
    pub fn account_numbers(&self) -> &[u64] {
        &self.account_numbers
    }

    /// The required signers, in the order their signatures must appear
    pub fn signers(&self) -> impl Iterator<Item = &Address> + '_ {
        self.signers.iter()
    }

    pub fn num_signers(&self) -> usize {
        self.signers.len()
    }

    /// Canonical encoding of the body. These exact bytes are signed and sent.
    pub fn body_bytes(&self) -> Bytes {
        encode(&proto::TxBody::from(&self.body)).into()
    }

    /// Canonical encoding of the auth info. These exact bytes are signed and sent.
    pub fn auth_info_bytes(&self) -> Bytes {
        encode(&proto::AuthInfo::from(&self.auth_info)).into()
    }

    /// The document the signer at position `idx` signs, if there is such a signer
    pub fn sign_doc(&self, idx: usize) -> Option<SignDoc> {
        let account_number = *self.account_numbers.get(idx)?;
        Some(SignDoc {
            body_bytes: self.body_bytes(),
            auth_info_bytes: self.auth_info_bytes(),
            chain_id: self.chain_id.clone(),
            account_number,
        })
    }

    /// One sign document per required signer, in signer order
    pub fn sign_docs(&self) -> Vec<SignDoc> {
        let body_bytes = self.body_bytes();
        let auth_info_bytes = self.auth_info_bytes();
        self.account_numbers
            .iter()
            .map(|account_number| SignDoc {
                body_bytes: body_bytes.clone(),
                auth_info_bytes: auth_info_bytes.clone(),
                chain_id: self.chain_id.clone(),
                account_number: *account_number,
            })
            .collect()
    }
}

/// What one signer signs: the body and auth info bytes bound to a chain and to the
/// signer's account number.
///
/// The sequence number, public key and fee are inside `auth_info_bytes`, so a
/// signature covers chain id, account number, sequence, fee, gas and every
/// message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignDoc {
    pub body_bytes: Bytes,
    pub auth_info_bytes: Bytes,
    pub chain_id: String,
    pub account_number: u64,
}

impl SignDoc {
    /// The bytes handed to the signing capability
    pub fn encode(&self) -> Bytes {
        encode(&proto::SignDoc::from(self)).into()
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, EncodingError> {
        Ok(decode_canonical::<proto::SignDoc>(bytes)?.into())
    }
}

impl From<&SignDoc> for proto::SignDoc {
    fn from(doc: &SignDoc) -> Self {
        proto::SignDoc {
            body_bytes: doc.body_bytes.to_vec(),
            auth_info_bytes: doc.auth_info_bytes.to_vec(),
            chain_id: doc.chain_id.clone(),
            account_number: doc.account_number,
        }
    }
}

impl From<proto::SignDoc> for SignDoc {
    fn from(raw: proto::SignDoc) -> Self {
        SignDoc {
            body_bytes: raw.body_bytes.into(),
            auth_info_bytes: raw.auth_info_bytes.into(),
            chain_id: raw.chain_id,
            account_number: raw.account_number,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        encoding::decode_canonical,
        proto,
        types::{
            msg::{MsgNewBlockHashes, Votes},
            transaction::TxBuilder,
            AccountMeta, SignDoc, UnsignedTx,
        },
    };

    fn draft(
        chain_id: &str,
        hashes: &[&[u8]],
        fee: &str,
        meta: AccountMeta,
        memo: &str,
    ) -> UnsignedTx {
        let msg = MsgNewBlockHashes::builder()
            .proposer("addr1")
            .start_block_number(100)
            .block_hashes(hashes.iter().map(|h| h.to_vec()))
            .vote(Votes::new(b"sig".to_vec()))
            .build()
            .unwrap();
        TxBuilder::new(chain_id)
            .message(&msg)
            .gas_limit(200_000)
            .fee(fee.parse().unwrap())
            .memo(memo)
            .account(meta)
            .build_unsigned()
            .unwrap()
    }

    fn sign_bytes(tx: &UnsignedTx) -> Vec<u8> {
        tx.sign_doc(0).unwrap().encode().to_vec()
    }

    #[test]
    fn sign_bytes_are_deterministic() {
        let a = draft("chain-1", &[b"h1", b"h2"], "1000denom", AccountMeta::new(5, 10), "");
        let b = draft("chain-1", &[b"h1", b"h2"], "1000denom", AccountMeta::new(5, 10), "");
        assert_eq!(sign_bytes(&a), sign_bytes(&b));
    }

    #[test]
    fn sign_bytes_change_with_any_field() {
        let base = sign_bytes(&draft("chain-1", &[b"h1", b"h2"], "1000denom", AccountMeta::new(5, 10), ""));
        let variants = [
            draft("chain-2", &[b"h1", b"h2"], "1000denom", AccountMeta::new(5, 10), ""),
            draft("chain-1", &[b"h2", b"h1"], "1000denom", AccountMeta::new(5, 10), ""),
            draft("chain-1", &[b"h1", b"h2"], "1001denom", AccountMeta::new(5, 10), ""),
            draft("chain-1", &[b"h1", b"h2"], "1000other", AccountMeta::new(5, 10), ""),
            draft("chain-1", &[b"h1", b"h2"], "1000denom", AccountMeta::new(6, 10), ""),
            draft("chain-1", &[b"h1", b"h2"], "1000denom", AccountMeta::new(5, 11), ""),
            draft("chain-1", &[b"h1", b"h2"], "1000denom", AccountMeta::new(5, 10), "memo"),
        ];
        for variant in &variants {
            assert_ne!(sign_bytes(variant), base);
        }
    }

    #[test]
    fn sign_doc_roundtrip() {
        let tx = draft("chain-1", &[b"h1"], "1000denom", AccountMeta::new(5, 10), "");
        let doc = tx.sign_doc(0).unwrap();
        assert_eq!(SignDoc::decode(&doc.encode()).unwrap(), doc);
        assert!(tx.sign_doc(1).is_none());
        assert_eq!(tx.sign_docs(), vec![doc]);
    }

    #[test]
    fn sign_doc_is_direct_mode_layout() {
        let tx = draft("chain-1", &[b"h1"], "1000denom", AccountMeta::new(5, 10), "");
        let bytes = sign_bytes(&tx);
        // body_bytes come first, as field 1
        assert_eq!(bytes[0], 0x0a);

        let raw = decode_canonical::<proto::SignDoc>(&bytes).unwrap();
        assert_eq!(raw.body_bytes, tx.body_bytes().to_vec());
        assert_eq!(raw.auth_info_bytes, tx.auth_info_bytes().to_vec());
        assert_eq!(raw.chain_id, "chain-1");
        assert_eq!(raw.account_number, 5);

        let auth_info = decode_canonical::<proto::AuthInfo>(&raw.auth_info_bytes).unwrap();
        assert_eq!(auth_info.signer_infos[0].sequence, 10);
        assert_eq!(auth_info.fee.unwrap().gas_limit, 200_000);
    }

    #[test]
    fn public_key_is_signed_over() {
        let without = draft("chain-1", &[b"h1"], "1000denom", AccountMeta::new(5, 10), "");
        let msg = MsgNewBlockHashes::builder()
            .proposer("addr1")
            .start_block_number(100)
            .block_hash(b"h1".to_vec())
            .vote(Votes::new(b"sig".to_vec()))
            .build()
            .unwrap();
        let with = TxBuilder::new("chain-1")
            .message(&msg)
            .gas_limit(200_000)
            .fee("1000denom".parse().unwrap())
            .account(AccountMeta::new(5, 10))
            .public_key([2u8; 33])
            .build_unsigned()
            .unwrap();
        assert_eq!(with.body_bytes(), without.body_bytes());
        assert_ne!(sign_bytes(&with), sign_bytes(&without));
    }
}
