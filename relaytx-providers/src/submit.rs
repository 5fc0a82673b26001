use crate::{JsonRpcClient, Provider, ProviderError, RpcError};
use async_trait::async_trait;
use auto_impl::auto_impl;
use relaytx_core::{
    encoding::EncodingError,
    types::{SignedTx, TxHash},
};
use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;
use tracing::{debug, warn};

/// Rejection code the ledger's `sdk` codespace uses for a stale account sequence.
pub const SEQUENCE_MISMATCH_CODE: i64 = 32;

/// An error submitting a signed transaction.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The signed transaction is structurally invalid. Unreachable for
    /// transactions produced by the pipeline.
    #[error("signed transaction cannot be encoded: {0}")]
    EncodingFailed(#[from] EncodingError),
    /// The node could not be reached; the transaction was not accepted
    #[error("transport unavailable: {0}")]
    TransportUnavailable(#[source] ProviderError),
    /// The node refused the transaction. Passed through verbatim.
    #[error("transaction rejected (codespace {codespace:?}, code {code}): {message}")]
    RemoteRejected {
        /// Rejection code assigned by the node
        code: i64,
        /// Module that produced the code, `jsonrpc` for JSON-RPC level errors
        codespace: String,
        /// Human readable reason
        message: String,
    },
    /// The caller cancelled, the deadline passed or the acknowledgment could not
    /// be read, after the bytes may have reached the node. The transaction may or
    /// may not be included on chain.
    #[error("no acknowledgment for submission of {tx_hash}; on-chain fate unknown")]
    Cancelled {
        /// Hash the transaction will have if it was accepted
        tx_hash: TxHash,
    },
}

impl SubmitError {
    /// `true` when the outcome of the submission cannot be known locally
    pub fn is_fate_unknown(&self) -> bool {
        matches!(self, SubmitError::Cancelled { .. })
    }

    /// `true` when the node rejected the transaction for a stale sequence number
    pub fn is_sequence_mismatch(&self) -> bool {
        matches!(
            self,
            SubmitError::RemoteRejected { code, codespace, .. }
                if *code == SEQUENCE_MISMATCH_CODE && codespace == "sdk"
        )
    }
}

/// The `broadcast_tx_sync` result.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastResponse {
    /// 0 on acceptance
    pub code: i64,
    #[serde(default)]
    pub codespace: String,
    #[serde(default)]
    pub log: String,
    /// Hash as reported by the node, upper-case hex
    #[serde(default)]
    pub hash: String,
}

/// Broadcasts signed transactions.
#[async_trait]
#[auto_impl(&, Box, Arc)]
pub trait TxSubmitter: std::fmt::Debug + Send + Sync {
    /// Encodes `tx`, sends it once and interprets the acknowledgment.
    ///
    /// On success the hash is `sha256` of the bytes that were sent.
    async fn submit(&self, tx: &SignedTx) -> Result<TxHash, SubmitError>;

    /// Like [`TxSubmitter::submit`], but gives up as soon as `cancel` completes.
    ///
    /// Giving up yields [`SubmitError::Cancelled`]: the node may already hold the
    /// transaction, so the result is neither success nor rejection.
    async fn submit_until<C>(&self, tx: &SignedTx, cancel: C) -> Result<TxHash, SubmitError>
    where
        C: Future<Output = ()> + Send,
    {
        let tx_hash = tx.hash();
        tokio::select! {
            res = self.submit(tx) => res,
            _ = cancel => {
                warn!(%tx_hash, "submission cancelled before acknowledgment");
                Err(SubmitError::Cancelled { tx_hash })
            }
        }
    }
}

#[async_trait]
impl<P: JsonRpcClient> TxSubmitter for Provider<P> {
    async fn submit(&self, tx: &SignedTx) -> Result<TxHash, SubmitError> {
        tx.validate()?;
        let tx_bytes = tx.encode();
        let tx_hash = TxHash::of(&tx_bytes);

        let res = match self.broadcast_tx_sync(&tx_bytes).await {
            Ok(res) => res,
            Err(err) => return Err(classify(err, tx_hash)),
        };
        if res.code != 0 {
            debug!(%tx_hash, code = res.code, codespace = %res.codespace, "transaction rejected");
            return Err(SubmitError::RemoteRejected {
                code: res.code,
                codespace: res.codespace,
                message: res.log,
            })
        }
        if !res.hash.is_empty() && !res.hash.eq_ignore_ascii_case(&tx_hash.to_string()) {
            warn!(local = %tx_hash, remote = %res.hash, "node reported a different transaction hash");
        }
        debug!(%tx_hash, "transaction accepted");
        Ok(tx_hash)
    }
}

fn classify(err: ProviderError, tx_hash: TxHash) -> SubmitError {
    if err.is_timeout() {
        warn!(%tx_hash, "broadcast deadline passed before acknowledgment");
        return SubmitError::Cancelled { tx_hash }
    }
    if err.is_undecodable_response() {
        warn!(%tx_hash, %err, "broadcast acknowledgment could not be decoded");
        return SubmitError::Cancelled { tx_hash }
    }
    if let Some(rpc) = err.as_error_response() {
        return SubmitError::RemoteRejected {
            code: rpc.code,
            codespace: "jsonrpc".to_owned(),
            message: rpc.message.clone(),
        }
    }
    SubmitError::TransportUnavailable(err)
}
