use crate::{error::PipelineError, signer::SignError, SigningSession};
use relaytx_core::types::{
    parse_coins, transaction::TxBuilder, AccountMeta, Address, Coin, CoinError, Msg, SignedTx,
    TxHash, UnsignedTx,
};
use relaytx_providers::{AccountRetriever, TxSubmitter};
use relaytx_signers::{Identity, Keyring};
use serde::{Deserialize, Serialize};
use std::{future::Future, pin::pin};
use tracing::{debug, info, warn};
use tracing_futures::Instrument;

/// Gas limit used when the configuration does not name one
pub const DEFAULT_GAS_LIMIT: u64 = 200_000;

fn default_gas_limit() -> u64 {
    DEFAULT_GAS_LIMIT
}

/// Parameters shared by every transaction a [`TxClient`] sends.
///
/// Deserializes from the `[tx]` table of a configuration file:
///
/// ```toml
/// chain_id = "48815"
/// key_name = "relayer"
/// gas_limit = 200000
/// fees = "1000ugoat"
/// sequence_retry = true
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TxConfig {
    pub chain_id: String,
    /// Keyring identity that signs and pays
    pub key_name: String,
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,
    /// Comma separated coin list, e.g. `"1000ugoat"`
    #[serde(default, with = "coins_string")]
    pub fees: Vec<Coin>,
    #[serde(default)]
    pub memo: String,
    /// Block height after which the transaction is invalid, 0 for none
    #[serde(default)]
    pub timeout_height: u64,
    /// Re-resolve, re-sign and resubmit once when the node rejects the
    /// transaction for a stale account sequence
    #[serde(default)]
    pub sequence_retry: bool,
}

impl TxConfig {
    pub fn new<C: Into<String>, K: Into<String>>(chain_id: C, key_name: K) -> Self {
        Self {
            chain_id: chain_id.into(),
            key_name: key_name.into(),
            gas_limit: DEFAULT_GAS_LIMIT,
            fees: Vec::new(),
            memo: String::new(),
            timeout_height: 0,
            sequence_retry: false,
        }
    }

    #[must_use]
    pub fn gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    /// Sets the fee from a coin list string such as `"1000ugoat"`
    pub fn fees(mut self, fees: &str) -> Result<Self, CoinError> {
        self.fees = parse_coins(fees)?;
        Ok(self)
    }

    #[must_use]
    pub fn memo<T: Into<String>>(mut self, memo: T) -> Self {
        self.memo = memo.into();
        self
    }

    #[must_use]
    pub fn timeout_height(mut self, height: u64) -> Self {
        self.timeout_height = height;
        self
    }

    #[must_use]
    pub fn sequence_retry(mut self, enabled: bool) -> Self {
        self.sequence_retry = enabled;
        self
    }
}

mod coins_string {
    use relaytx_core::types::{parse_coins, Coin};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(coins: &[Coin], s: S) -> Result<S::Ok, S::Error> {
        let joined = coins.iter().map(ToString::to_string).collect::<Vec<_>>().join(",");
        s.serialize_str(&joined)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Coin>, D::Error> {
        let raw = String::deserialize(d)?;
        parse_coins(&raw).map_err(D::Error::custom)
    }
}

/// Runs the resolve, build, sign and submit pipeline.
///
/// The client owns no mutable state: the account retriever, submitter and keyring
/// are capabilities that may be shared (by reference or `Arc`) with other clients,
/// and nothing is cached between calls. Every send resolves the accounts afresh.
///
/// ```no_run
/// use relaytx_core::types::msg::{MsgNewBlockHashes, Votes};
/// use relaytx_middleware::{TxClient, TxConfig};
/// use relaytx_providers::{Http, Provider};
/// use relaytx_signers::MemoryKeyring;
/// use std::sync::Arc;
///
/// # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = Arc::new(Provider::<Http>::try_from("http://localhost:26657")?);
/// let keyring = MemoryKeyring::new();
/// let relayer = keyring.generate("relayer", "goat")?;
///
/// let config = TxConfig::new("48815", "relayer").fees("1000ugoat")?;
/// let client = TxClient::new(provider.clone(), provider, keyring, config);
///
/// let msg = MsgNewBlockHashes::builder()
///     .proposer(relayer.address.as_str())
///     .start_block_number(100)
///     .block_hash(vec![0xab; 32])
///     .vote(Votes::new(vec![1u8; 48]))
///     .build()?;
/// let tx_hash = client.send(&[msg]).await?;
/// println!("broadcast {tx_hash}");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct TxClient<R, S, K> {
    resolver: R,
    submitter: S,
    keyring: K,
    config: TxConfig,
}

impl<R, S, K> TxClient<R, S, K>
where
    R: AccountRetriever,
    S: TxSubmitter,
    K: Keyring,
{
    pub fn new(resolver: R, submitter: S, keyring: K, config: TxConfig) -> Self {
        Self { resolver, submitter, keyring, config }
    }

    pub fn config(&self) -> &TxConfig {
        &self.config
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn submitter(&self) -> &S {
        &self.submitter
    }

    pub fn keyring(&self) -> &K {
        &self.keyring
    }

    /// The identity configured to sign
    pub async fn identity(&self) -> Result<Identity, PipelineError> {
        let name = &self.config.key_name;
        self.keyring
            .identity(name)
            .await
            .map_err(|err| SignError::from_keyring(name, err).into())
    }

    /// Looks up the current account number and sequence of `address`
    pub async fn resolve(&self, address: &Address) -> Result<AccountMeta, PipelineError> {
        Ok(self.resolver.resolve(address).await?)
    }

    /// Builds a draft from already resolved accounts, one per required signer.
    ///
    /// The public key of `identity` goes into the signer info of its position,
    /// if it is a required signer at all.
    pub fn build_with<M: Msg>(
        &self,
        messages: &[M],
        accounts: &[(Address, AccountMeta)],
        identity: &Identity,
    ) -> Result<UnsignedTx, PipelineError> {
        for msg in messages {
            msg.validate()?;
        }
        let mut builder = TxBuilder::new(self.config.chain_id.as_str())
            .gas_limit(self.config.gas_limit)
            .fees(self.config.fees.iter().cloned())
            .memo(self.config.memo.as_str())
            .timeout_height(self.config.timeout_height);
        for msg in messages {
            builder = builder.message(msg);
        }
        for (signer, meta) in accounts {
            builder = builder.signer_account(signer.clone(), *meta);
        }
        if messages.iter().any(|msg| *msg.signer() == identity.address) {
            builder =
                builder.signer_public_key(identity.address.clone(), identity.public_key.clone());
        }
        Ok(builder.build_unsigned()?)
    }

    /// Resolves every required signer of `messages` and builds the draft.
    pub async fn build<M: Msg + Sync>(&self, messages: &[M]) -> Result<UnsignedTx, PipelineError> {
        for msg in messages {
            msg.validate()?;
        }
        let mut accounts: Vec<(Address, AccountMeta)> = Vec::new();
        for msg in messages {
            let signer = msg.signer();
            if accounts.iter().any(|(address, _)| address == signer) {
                continue
            }
            let meta = self.resolve(signer).await?;
            accounts.push((signer.clone(), meta));
        }
        let identity = self.identity().await?;
        let draft = self.build_with(messages, &accounts, &identity)?;
        debug!(messages = messages.len(), signers = draft.num_signers(), "built draft");
        Ok(draft)
    }

    /// Signs every position of `draft` that belongs to the configured identity.
    ///
    /// Drafts with other signers fail with
    /// [`SignError::IncompleteSignerSet`]; use a [`SigningSession`] to combine
    /// several identities.
    pub async fn sign(&self, draft: &UnsignedTx) -> Result<SignedTx, PipelineError> {
        let mut session = SigningSession::new(draft);
        session.sign_as(&self.keyring, &self.config.key_name).await?;
        let signed = session.finalize()?;
        debug!(tx_hash = %signed.hash(), "signed draft");
        Ok(signed)
    }

    /// Broadcasts `tx` once
    pub async fn submit(&self, tx: &SignedTx) -> Result<TxHash, PipelineError> {
        Ok(self.submitter.submit(tx).await?)
    }

    /// Runs resolve, build, sign and submit for `messages`, returning the hash of
    /// the accepted transaction.
    pub async fn send<M: Msg + Sync>(&self, messages: &[M]) -> Result<TxHash, PipelineError> {
        self.send_until(messages, std::future::pending()).await
    }

    /// Like [`TxClient::send`], but abandons the submission when `cancel`
    /// completes. An abandoned submission has an unknown fate, see
    /// [`PipelineError::pending_hash`].
    pub async fn send_until<M, C>(&self, messages: &[M], cancel: C) -> Result<TxHash, PipelineError>
    where
        M: Msg + Sync,
        C: Future<Output = ()> + Send,
    {
        let span = tracing::debug_span!(
            "send",
            chain_id = %self.config.chain_id,
            key_name = %self.config.key_name
        );
        async move {
            let mut cancel = pin!(cancel);

            let signed = self.build_and_sign(messages).await?;
            let res = match self.submitter.submit_until(&signed, cancel.as_mut()).await {
                Err(err) if self.config.sequence_retry && err.is_sequence_mismatch() => {
                    warn!(%err, "account sequence is stale, resolving again and resubmitting once");
                    let signed = self.build_and_sign(messages).await?;
                    self.submitter.submit_until(&signed, cancel.as_mut()).await
                }
                res => res,
            };

            let tx_hash = res?;
            info!(%tx_hash, "transaction accepted for broadcast");
            Ok::<_, PipelineError>(tx_hash)
        }
        .instrument(span)
        .await
    }

    async fn build_and_sign<M: Msg + Sync>(&self, messages: &[M]) -> Result<SignedTx, PipelineError> {
        let draft = self.build(messages).await?;
        self.sign(&draft).await
    }
}
