use crate::{
    account::AccountResponse, submit::BroadcastResponse, Http as HttpProvider, JsonRpcClient,
    MockProvider, ProviderError,
};
use base64::{engine::general_purpose, Engine};
use relaytx_core::types::Address;
use serde::{de::DeserializeOwned, Serialize};
use std::{convert::TryFrom, fmt::Debug, time::Duration};
use tracing::trace;
use tracing_futures::Instrument;
use url::{ParseError, Url};

/// An abstract provider for interacting with a ledger node's JSON-RPC API.
/// Must be instantiated with a data transport which implements the
/// [`JsonRpcClient`](trait@crate::JsonRpcClient) trait (e.g. [HTTP](crate::Http)).
///
/// An optional timeout turns every request into a deadline-bounded call; a
/// request that hits it fails with [`ProviderError::Timeout`].
///
/// # Example
///
/// ```no_run
/// use relaytx_providers::{Http, Provider};
/// use std::{convert::TryFrom, time::Duration};
///
/// # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = Provider::<Http>::try_from("http://localhost:26657")?
///     .with_timeout(Duration::from_secs(5));
/// let status: serde_json::Value = provider.request("status", ()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Provider<P> {
    inner: P,
    timeout: Option<Duration>,
}

impl<P> AsRef<P> for Provider<P> {
    fn as_ref(&self) -> &P {
        &self.inner
    }
}

impl<P: JsonRpcClient> Provider<P> {
    /// Instantiate a new provider with a backend.
    pub fn new(provider: P) -> Self {
        Self { inner: provider, timeout: None }
    }

    /// Sets the deadline applied to every request
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Make an RPC request via the internal connection, and return the result.
    pub async fn request<T, R>(&self, method: &str, params: T) -> Result<R, ProviderError>
    where
        T: Debug + Serialize + Send + Sync,
        R: Serialize + DeserializeOwned + Debug + Send,
    {
        let span =
            tracing::trace_span!("rpc", method = method, params = ?serde_json::to_string(&params)?);
        // https://docs.rs/tracing/0.1.22/tracing/span/struct.Span.html#in-asynchronous-code
        let res = async move {
            trace!("tx");
            let call = self.inner.request(method, params);
            let res: R = match self.timeout {
                Some(timeout) => tokio::time::timeout(timeout, call)
                    .await
                    .map_err(|_| ProviderError::Timeout(timeout))?
                    .map_err(Into::into)?,
                None => call.await.map_err(Into::into)?,
            };
            trace!(rx = ?serde_json::to_string(&res)?);
            Ok::<_, ProviderError>(res)
        }
        .instrument(span)
        .await?;
        Ok(res)
    }

    /// Queries the account state of `address`. `None` means the ledger has never
    /// seen the address.
    pub async fn get_account(
        &self,
        address: &Address,
    ) -> Result<Option<AccountResponse>, ProviderError> {
        self.request("auth_account", [address.as_str()]).await
    }

    /// Broadcasts encoded transaction bytes, waiting for the node's admission check
    /// but not for inclusion in a block.
    pub async fn broadcast_tx_sync(&self, tx_bytes: &[u8]) -> Result<BroadcastResponse, ProviderError> {
        let params = BroadcastParams { tx: general_purpose::STANDARD.encode(tx_bytes) };
        self.request("broadcast_tx_sync", params).await
    }
}

#[derive(Debug, Serialize)]
struct BroadcastParams {
    tx: String,
}

impl Provider<MockProvider> {
    /// Returns a `Provider` instantiated with an internal "mock" transport.
    ///
    /// # Example
    ///
    /// ```
    /// # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
    /// use relaytx_providers::Provider;
    /// // Instantiate the provider
    /// let (provider, mock) = Provider::mocked();
    /// // Push the mock response
    /// mock.push(12u64)?;
    /// // Make the call
    /// let height: u64 = provider.request("block_height", ()).await?;
    /// // The response matches
    /// assert_eq!(height, 12);
    /// // and the request as well!
    /// mock.assert_request("block_height", ())?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn mocked() -> (Self, MockProvider) {
        let mock = MockProvider::new();
        let mock_clone = mock.clone();
        (Self::new(mock), mock_clone)
    }
}

impl TryFrom<&str> for Provider<HttpProvider> {
    type Error = ParseError;

    fn try_from(src: &str) -> Result<Self, Self::Error> {
        Ok(Provider::new(HttpProvider::new(Url::parse(src)?)))
    }
}

impl TryFrom<String> for Provider<HttpProvider> {
    type Error = ParseError;

    fn try_from(src: String) -> Result<Self, Self::Error> {
        Provider::try_from(src.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockResponse;
    use tracing_test::traced_test;

    #[tokio::test]
    #[traced_test]
    async fn traces_requests() {
        let (provider, mock) = Provider::mocked();
        mock.push(7u64).unwrap();
        let value: u64 = provider.request("block_height", ()).await.unwrap();
        assert_eq!(value, 7);
        assert!(logs_contain("rpc"));
        assert!(logs_contain("block_height"));
    }

    #[tokio::test]
    async fn enforces_timeout() {
        let (provider, mock) = Provider::mocked();
        let provider = provider.with_timeout(Duration::from_millis(10));
        mock.push_response(MockResponse::Delayed(
            Duration::from_secs(5),
            Box::new(MockResponse::Value(serde_json::json!(1))),
        ));
        let err = provider.request::<_, u64>("block_height", ()).await.unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn encodes_broadcast_params() {
        let (provider, mock) = Provider::mocked();
        mock.push(serde_json::json!({ "code": 0, "log": "", "hash": "" })).unwrap();
        provider.broadcast_tx_sync(&[1, 2, 3]).await.unwrap();
        mock.assert_request("broadcast_tx_sync", serde_json::json!({ "tx": "AQID" })).unwrap();
    }

    #[test]
    fn parses_http_url() {
        let provider = Provider::<HttpProvider>::try_from("http://localhost:26657").unwrap();
        assert_eq!(provider.as_ref().url().as_str(), "http://localhost:26657/");
        assert!(Provider::<HttpProvider>::try_from("not a url").is_err());
    }
}
