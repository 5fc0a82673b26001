use crate::{
    encoding::{decode_canonical, EncodingError, PUBKEY_TYPE_URL, SIGN_MODE},
    proto::{self, mode_info},
    types::{Any, Bytes, Fee},
};
use serde::{Deserialize, Serialize};

/// Length of a compressed secp256k1 public key.
pub const PUBLIC_KEY_LENGTH: usize = 33;

/// The messages of a transaction and their transaction-level metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxBody {
    /// Messages, executed in order
    pub messages: Vec<Any>,
    /// Free-form note attached to the transaction
    pub memo: String,
    /// Block height after which the transaction is no longer valid, 0 for none
    pub timeout_height: u64,
}

impl From<&TxBody> for proto::TxBody {
    fn from(body: &TxBody) -> Self {
        proto::TxBody {
            messages: body.messages.iter().map(Into::into).collect(),
            memo: body.memo.clone(),
            timeout_height: body.timeout_height,
        }
    }
}

impl From<proto::TxBody> for TxBody {
    fn from(raw: proto::TxBody) -> Self {
        TxBody {
            messages: raw.messages.into_iter().map(Into::into).collect(),
            memo: raw.memo,
            timeout_height: raw.timeout_height,
        }
    }
}

/// A required signer's public key and the sequence its signature is bound to.
///
/// The key lets the ledger verify the signature of an account that has never
/// signed before. It may be left out for accounts whose key is already on chain.
/// Every signer signs in `SIGN_MODE_DIRECT`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignerInfo {
    /// Compressed secp256k1 public key
    pub public_key: Option<Bytes>,
    pub sequence: u64,
}

impl From<&SignerInfo> for proto::SignerInfo {
    fn from(info: &SignerInfo) -> Self {
        proto::SignerInfo {
            public_key: info.public_key.as_ref().map(|key| proto::Any {
                type_url: PUBKEY_TYPE_URL.to_owned(),
                value: prost::Message::encode_to_vec(&proto::PubKey { key: key.to_vec() }),
            }),
            mode_info: Some(proto::ModeInfo {
                sum: Some(mode_info::Sum::Single(mode_info::Single { mode: SIGN_MODE as i32 })),
            }),
            sequence: info.sequence,
        }
    }
}

impl TryFrom<proto::SignerInfo> for SignerInfo {
    type Error = EncodingError;

    fn try_from(raw: proto::SignerInfo) -> Result<Self, Self::Error> {
        match raw.mode_info.and_then(|info| info.sum) {
            Some(mode_info::Sum::Single(single)) if single.mode == SIGN_MODE as i32 => {}
            other => {
                return Err(EncodingError::invalid(
                    "mode_info",
                    format!("only SIGN_MODE_DIRECT is supported, got {other:?}"),
                ))
            }
        }
        let public_key = match raw.public_key {
            None => None,
            Some(any) if any.type_url == PUBKEY_TYPE_URL => {
                let key = decode_canonical::<proto::PubKey>(&any.value)?.key;
                if key.len() != PUBLIC_KEY_LENGTH {
                    return Err(EncodingError::invalid(
                        "public_key",
                        format!("expected {PUBLIC_KEY_LENGTH} bytes, got {}", key.len()),
                    ))
                }
                Some(key.into())
            }
            Some(any) => {
                return Err(EncodingError::invalid(
                    "public_key",
                    format!("unsupported key type {:?}", any.type_url),
                ))
            }
        };
        Ok(SignerInfo { public_key, sequence: raw.sequence })
    }
}

/// Who signs a transaction and what they pay for it.
///
/// `signer_infos` is ordered: signature `i` of the signed transaction belongs to
/// `signer_infos[i]`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthInfo {
    pub signer_infos: Vec<SignerInfo>,
    pub fee: Fee,
}

impl From<&AuthInfo> for proto::AuthInfo {
    fn from(auth_info: &AuthInfo) -> Self {
        proto::AuthInfo {
            signer_infos: auth_info.signer_infos.iter().map(Into::into).collect(),
            fee: Some((&auth_info.fee).into()),
        }
    }
}

impl TryFrom<proto::AuthInfo> for AuthInfo {
    type Error = EncodingError;

    fn try_from(raw: proto::AuthInfo) -> Result<Self, Self::Error> {
        let signer_infos = raw
            .signer_infos
            .into_iter()
            .map(SignerInfo::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let fee = raw.fee.ok_or_else(|| EncodingError::invalid("fee", "missing"))?.try_into()?;
        Ok(AuthInfo { signer_infos, fee })
    }
}
