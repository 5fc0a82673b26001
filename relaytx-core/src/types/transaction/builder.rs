use super::{body::PUBLIC_KEY_LENGTH, AuthInfo, SignerInfo, TxBody, UnsignedTx};
use crate::types::{
    coin::normalize_coins, AccountMeta, Address, Any, Bytes, Coin, CoinError, Fee, MessageError,
    Msg,
};
use thiserror::Error;

/// An error assembling a transaction draft. Every variant is a caller error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// A transaction needs at least one message
    #[error("transaction has no messages")]
    NoMessages,
    /// The gas limit must be positive
    #[error("gas limit must be greater than zero")]
    ZeroGas,
    /// The chain id is empty or only whitespace
    #[error("chain id is blank")]
    BlankChainId,
    /// A fee coin is malformed or repeated
    #[error("invalid fee: {0}")]
    InvalidFee(#[from] CoinError),
    /// No account number and sequence were given for a required signer
    #[error("no account metadata for signer {0}")]
    MissingAccount(Address),
    /// Account metadata or a public key was given for an address that signs
    /// none of the messages
    #[error("{0} is not a required signer")]
    UnknownSigner(Address),
    /// A signer public key is not a compressed secp256k1 point
    #[error("public key of {0} is not a {PUBLIC_KEY_LENGTH} byte compressed secp256k1 key")]
    InvalidPublicKey(Address),
    /// A message failed its own payload checks
    #[error(transparent)]
    InvalidMessage(#[from] MessageError),
}

/// Assembles messages, fee, gas and account metadata into an [`UnsignedTx`].
///
/// The required signers are the signers of the messages, in the order they first
/// appear. [`TxBuilder::account`] supplies the account metadata of the first
/// signer, which covers the usual single-signer case; any further signer needs
/// [`TxBuilder::signer_account`]. Public keys follow the same pattern with
/// [`TxBuilder::public_key`] and [`TxBuilder::signer_public_key`].
#[derive(Clone, Debug)]
#[must_use]
pub struct TxBuilder {
    chain_id: String,
    messages: Vec<(Any, Address)>,
    gas_limit: u64,
    fees: Vec<Coin>,
    memo: String,
    timeout_height: u64,
    account: Option<AccountMeta>,
    signer_accounts: Vec<(Address, AccountMeta)>,
    public_key: Option<Bytes>,
    signer_public_keys: Vec<(Address, Bytes)>,
    invalid_message: Option<MessageError>,
}

impl TxBuilder {
    /// Starts a draft for the chain `chain_id`, with no messages, no fee and a
    /// gas limit of zero
    pub fn new<T: Into<String>>(chain_id: T) -> Self {
        Self {
            chain_id: chain_id.into(),
            messages: Vec::new(),
            gas_limit: 0,
            fees: Vec::new(),
            memo: String::new(),
            timeout_height: 0,
            account: None,
            signer_accounts: Vec::new(),
            public_key: None,
            signer_public_keys: Vec::new(),
            invalid_message: None,
        }
    }

    /// Appends a typed message. A message that fails [`Msg::validate`] makes
    /// [`TxBuilder::build_unsigned`] fail.
    pub fn message<M: Msg>(mut self, msg: &M) -> Self {
        if let Err(err) = msg.validate() {
            self.invalid_message.get_or_insert(err);
        }
        self.messages.push((msg.to_any(), msg.signer().clone()));
        self
    }

    /// Appends an already enveloped message with its signer
    pub fn any_message(mut self, any: Any, signer: Address) -> Self {
        self.messages.push((any, signer));
        self
    }

    pub fn gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    /// Adds one fee coin
    pub fn fee(mut self, coin: Coin) -> Self {
        self.fees.push(coin);
        self
    }

    /// Replaces the fee coins
    pub fn fees<I: IntoIterator<Item = Coin>>(mut self, coins: I) -> Self {
        self.fees = coins.into_iter().collect();
        self
    }

    pub fn memo<T: Into<String>>(mut self, memo: T) -> Self {
        self.memo = memo.into();
        self
    }

    pub fn timeout_height(mut self, height: u64) -> Self {
        self.timeout_height = height;
        self
    }

    /// Account metadata of the first required signer
    pub fn account(mut self, meta: AccountMeta) -> Self {
        self.account = Some(meta);
        self
    }

    /// Account metadata of a specific signer. Takes precedence over
    /// [`TxBuilder::account`].
    pub fn signer_account(mut self, signer: Address, meta: AccountMeta) -> Self {
        self.signer_accounts.retain(|(address, _)| *address != signer);
        self.signer_accounts.push((signer, meta));
        self
    }

    /// Compressed public key of the first required signer
    pub fn public_key<T: Into<Bytes>>(mut self, key: T) -> Self {
        self.public_key = Some(key.into());
        self
    }

    /// Compressed public key of a specific signer. Takes precedence over
    /// [`TxBuilder::public_key`].
    pub fn signer_public_key<T: Into<Bytes>>(mut self, signer: Address, key: T) -> Self {
        self.signer_public_keys.retain(|(address, _)| *address != signer);
        self.signer_public_keys.push((signer, key.into()));
        self
    }

    /// Validates the parameters and produces the draft.
    pub fn build_unsigned(self) -> Result<UnsignedTx, BuildError> {
        if let Some(err) = self.invalid_message {
            return Err(err.into())
        }
        if self.chain_id.trim().is_empty() {
            return Err(BuildError::BlankChainId)
        }
        if self.messages.is_empty() {
            return Err(BuildError::NoMessages)
        }
        if self.gas_limit == 0 {
            return Err(BuildError::ZeroGas)
        }
        let mut fees = self.fees;
        normalize_coins(&mut fees)?;

        let mut signers: Vec<Address> = Vec::new();
        for (_, signer) in &self.messages {
            if !signers.contains(signer) {
                signers.push(signer.clone());
            }
        }
        let unknown = self
            .signer_accounts
            .iter()
            .map(|(address, _)| address)
            .chain(self.signer_public_keys.iter().map(|(address, _)| address))
            .find(|address| !signers.contains(address));
        if let Some(unknown) = unknown {
            return Err(BuildError::UnknownSigner(unknown.clone()))
        }

        let mut signer_infos = Vec::with_capacity(signers.len());
        let mut account_numbers = Vec::with_capacity(signers.len());
        for (idx, signer) in signers.iter().enumerate() {
            let explicit = self
                .signer_accounts
                .iter()
                .find(|(address, _)| address == signer)
                .map(|(_, meta)| *meta);
            let meta = match explicit.or(if idx == 0 { self.account } else { None }) {
                Some(meta) => meta,
                None => return Err(BuildError::MissingAccount(signer.clone())),
            };

            let public_key = self
                .signer_public_keys
                .iter()
                .find(|(address, _)| address == signer)
                .map(|(_, key)| key.clone())
                .or_else(|| if idx == 0 { self.public_key.clone() } else { None });
            if let Some(key) = &public_key {
                if key.len() != PUBLIC_KEY_LENGTH || !matches!(key[0], 0x02 | 0x03) {
                    return Err(BuildError::InvalidPublicKey(signer.clone()))
                }
            }

            account_numbers.push(meta.account_number);
            signer_infos.push(SignerInfo { public_key, sequence: meta.sequence });
        }

        let body = TxBody {
            messages: self.messages.into_iter().map(|(any, _)| any).collect(),
            memo: self.memo,
            timeout_height: self.timeout_height,
        };
        let auth_info = AuthInfo { signer_infos, fee: Fee { amount: fees, gas_limit: self.gas_limit } };
        Ok(UnsignedTx::new(body, auth_info, self.chain_id, signers, account_numbers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::msg::{MsgNewBlockHashes, Votes};

    fn msg(proposer: &str) -> MsgNewBlockHashes {
        MsgNewBlockHashes::builder()
            .proposer(proposer)
            .start_block_number(1)
            .block_hash(b"h1".to_vec())
            .vote(Votes::new(b"sig".to_vec()))
            .build()
            .unwrap()
    }

    fn builder() -> TxBuilder {
        TxBuilder::new("chain-1")
            .message(&msg("addr1"))
            .gas_limit(200_000)
            .fee("1000denom".parse().unwrap())
            .account(AccountMeta::new(5, 10))
    }

    #[test]
    fn builds_single_signer_draft() {
        let draft = builder().build_unsigned().unwrap();
        assert_eq!(draft.chain_id(), "chain-1");
        assert_eq!(draft.account_numbers(), &[5]);
        assert_eq!(draft.auth_info().signer_infos[0].sequence, 10);
        assert_eq!(draft.auth_info().fee.gas_limit, 200_000);
        assert_eq!(draft.signers().collect::<Vec<_>>(), vec![&Address::new("addr1").unwrap()]);
    }

    #[test]
    fn rejects_invalid_parameters() {
        assert_eq!(builder().gas_limit(0).build_unsigned().unwrap_err(), BuildError::ZeroGas);
        assert_eq!(
            TxBuilder::new(" ").message(&msg("addr1")).gas_limit(1).build_unsigned().unwrap_err(),
            BuildError::BlankChainId
        );
        assert_eq!(
            TxBuilder::new("chain-1").gas_limit(1).build_unsigned().unwrap_err(),
            BuildError::NoMessages
        );

        let bad_denom = Coin { denom: "1x".to_owned(), amount: 1 };
        assert!(matches!(
            builder().fee(bad_denom).build_unsigned(),
            Err(BuildError::InvalidFee(CoinError::InvalidDenom(_)))
        ));
        assert!(matches!(
            builder().fee("5denom".parse().unwrap()).build_unsigned(),
            Err(BuildError::InvalidFee(CoinError::DuplicateDenom(_)))
        ));
    }

    #[test]
    fn zero_fee_is_allowed() {
        let draft = builder().fees(Vec::new()).build_unsigned().unwrap();
        assert!(draft.auth_info().fee.amount.is_empty());
    }

    #[test]
    fn multi_signer_needs_every_account() {
        let second = Address::new("addr2").unwrap();
        let missing = builder().message(&msg("addr2")).build_unsigned().unwrap_err();
        assert_eq!(missing, BuildError::MissingAccount(second.clone()));

        let draft = builder()
            .message(&msg("addr2"))
            .message(&msg("addr1"))
            .signer_account(second.clone(), AccountMeta::new(7, 1))
            .build_unsigned()
            .unwrap();
        assert_eq!(draft.body().messages.len(), 3);
        assert_eq!(draft.account_numbers(), &[5, 7]);
        assert_eq!(draft.signers().nth(1), Some(&second));

        let unknown = builder()
            .signer_account(Address::new("addr9").unwrap(), AccountMeta::new(1, 1))
            .build_unsigned()
            .unwrap_err();
        assert!(matches!(unknown, BuildError::UnknownSigner(_)));
    }

    #[test]
    fn public_keys_go_into_signer_infos() {
        let draft = builder().public_key([2u8; 33]).build_unsigned().unwrap();
        assert_eq!(draft.auth_info().signer_infos[0].public_key, Some(Bytes::from([2u8; 33])));

        let draft = builder().build_unsigned().unwrap();
        assert_eq!(draft.auth_info().signer_infos[0].public_key, None);

        let second = Address::new("addr2").unwrap();
        let draft = builder()
            .message(&msg("addr2"))
            .signer_account(second.clone(), AccountMeta::new(7, 1))
            .public_key([2u8; 33])
            .signer_public_key(second, [3u8; 33])
            .build_unsigned()
            .unwrap();
        let keys: Vec<_> =
            draft.auth_info().signer_infos.iter().map(|info| info.public_key.clone()).collect();
        assert_eq!(keys, vec![Some(Bytes::from([2u8; 33])), Some(Bytes::from([3u8; 33]))]);
    }

    #[test]
    fn rejects_malformed_public_keys() {
        let addr1 = Address::new("addr1").unwrap();
        for key in [vec![2u8; 32], vec![4u8; 33], vec![2u8; 65]] {
            assert_eq!(
                builder().public_key(key).build_unsigned().unwrap_err(),
                BuildError::InvalidPublicKey(addr1.clone())
            );
        }
        assert!(matches!(
            builder()
                .signer_public_key(Address::new("addr9").unwrap(), [2u8; 33])
                .build_unsigned(),
            Err(BuildError::UnknownSigner(_))
        ));
    }

    /// A message type whose payload checks always fail.
    struct Unchecked(Address);

    impl Msg for Unchecked {
        const TYPE_URL: &'static str = "/test.Unchecked";
        type Proto = crate::proto::Any;

        fn signer(&self) -> &Address {
            &self.0
        }

        fn validate(&self) -> Result<(), MessageError> {
            Err(MessageError::InvalidPayload("never valid".to_owned()))
        }

        fn to_proto(&self) -> crate::proto::Any {
            crate::proto::Any::default()
        }

        fn from_proto(_: crate::proto::Any) -> Result<Self, MessageError> {
            Err(MessageError::InvalidPayload("never valid".to_owned()))
        }
    }

    #[test]
    fn invalid_messages_fail_the_build() {
        let err = builder().message(&Unchecked(Address::new("addr1").unwrap())).build_unsigned();
        assert_eq!(
            err.unwrap_err(),
            BuildError::InvalidMessage(MessageError::InvalidPayload("never valid".to_owned()))
        );
    }
}
