use crate::signer::SignError;
use relaytx_core::{
    encoding::EncodingError,
    types::{BuildError, MessageError},
};
use relaytx_providers::{ResolveError, SubmitError};
use std::fmt;
use thiserror::Error;

/// Coarse classification of a pipeline failure, used to decide whether to retry,
/// re-resolve the account or abort.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidPayload,
    InvalidTransactionParameters,
    AccountNotFound,
    ResolverUnavailable,
    SigningIdentityNotFound,
    SigningFailed,
    IncompleteSignerSet,
    EncodingFailed,
    TransportUnavailable,
    RemoteRejected,
    /// The transaction was handed to the node but no acknowledgment came back.
    /// It may or may not be on chain.
    FateUnknown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// An error from any stage of [`TxClient`](crate::TxClient).
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Message(#[from] MessageError),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Sign(#[from] SignError),
    #[error(transparent)]
    Submit(#[from] SubmitError),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Message(MessageError::Encoding(_)) => ErrorKind::EncodingFailed,
            PipelineError::Message(_) => ErrorKind::InvalidPayload,
            PipelineError::Build(BuildError::InvalidMessage(_)) => ErrorKind::InvalidPayload,
            PipelineError::Build(_) => ErrorKind::InvalidTransactionParameters,
            PipelineError::Resolve(ResolveError::AccountNotFound(_)) => ErrorKind::AccountNotFound,
            PipelineError::Resolve(ResolveError::ResolverUnavailable(_)) => {
                ErrorKind::ResolverUnavailable
            }
            PipelineError::Sign(err) => match err {
                SignError::IdentityNotFound(_) => ErrorKind::SigningIdentityNotFound,
                SignError::IncompleteSignerSet { .. } => ErrorKind::IncompleteSignerSet,
                SignError::Encoding(_) => ErrorKind::EncodingFailed,
                SignError::SigningFailed { .. } |
                SignError::SignerMismatch { .. } |
                SignError::UnknownPosition { .. } => ErrorKind::SigningFailed,
            },
            PipelineError::Submit(err) => match err {
                SubmitError::EncodingFailed(_) => ErrorKind::EncodingFailed,
                SubmitError::TransportUnavailable(_) => ErrorKind::TransportUnavailable,
                SubmitError::RemoteRejected { .. } => ErrorKind::RemoteRejected,
                SubmitError::Cancelled { .. } => ErrorKind::FateUnknown,
            },
            PipelineError::Encoding(_) => ErrorKind::EncodingFailed,
        }
    }

    /// `true` for collaborator availability failures, which a caller may retry
    /// after resolving the account again.
    ///
    /// Remote rejections and unknown fates are never retryable: resubmitting could
    /// pay the fee twice or duplicate the intent.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::AccountNotFound |
                ErrorKind::ResolverUnavailable |
                ErrorKind::TransportUnavailable
        )
    }

    /// The hash of a transaction whose fate is unknown
    pub fn pending_hash(&self) -> Option<relaytx_core::types::TxHash> {
        match self {
            PipelineError::Submit(SubmitError::Cancelled { tx_hash }) => Some(*tx_hash),
            _ => None,
        }
    }
}
