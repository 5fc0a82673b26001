use crate::{JsonRpcClient, ProviderError};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::{
    borrow::Borrow,
    collections::VecDeque,
    fmt::Debug,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};
use thiserror::Error;

/// Helper type that can be used to pass through the `params` value.
/// This is necessary because the wrapper provider is supposed to skip the `params` if it's of
/// size 0, see `crate::transports::common::Request`
#[derive(Debug)]
enum MockParams {
    Value(Value),
    Zst,
}

/// Helper response type for `MockProvider`, allowing custom JSON-RPC errors to be provided.
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// Successful response with a `serde_json::Value`.
    Value(Value),

    /// Error response with a `JsonRpcError`.
    Error(super::JsonRpcError),

    /// The transport itself fails, e.g. connection refused.
    TransportError(String),

    /// The inner response, delivered after a delay.
    Delayed(Duration, Box<MockResponse>),
}

#[derive(Clone, Debug)]
/// Mock transport used in test environments.
///
/// Responses are replayed in the order they were pushed, one per request.
pub struct MockProvider {
    requests: Arc<Mutex<VecDeque<(String, MockParams)>>>,
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl JsonRpcClient for MockProvider {
    type Error = MockError;

    /// Pushes the `(method, params)` to the back of the `requests` queue,
    /// pops the responses from the front of the `responses` queue
    async fn request<T, R>(&self, method: &str, params: T) -> Result<R, MockError>
    where
        T: Debug + Serialize + Send + Sync,
        R: DeserializeOwned + Send,
    {
        let params = if std::mem::size_of::<T>() == 0 {
            MockParams::Zst
        } else {
            MockParams::Value(serde_json::to_value(params)?)
        };
        lock(&self.requests).push_back((method.to_owned(), params));
        let mut element = lock(&self.responses).pop_front().ok_or(MockError::EmptyResponses)?;
        loop {
            match element {
                MockResponse::Value(value) => {
                    return serde_json::from_value(value).map_err(MockError::MalformedResponse)
                }
                MockResponse::Error(error) => return Err(MockError::JsonRpcError(error)),
                MockResponse::TransportError(reason) => return Err(MockError::Transport(reason)),
                MockResponse::Delayed(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    element = *inner;
                }
            }
        }
    }
}

impl MockProvider {
    /// Checks that the provided request was submitted by the client
    pub fn assert_request<T: Serialize + Send + Sync>(
        &self,
        method: &str,
        data: T,
    ) -> Result<(), MockError> {
        let (m, inp) = lock(&self.requests).pop_front().ok_or(MockError::EmptyRequests)?;
        assert_eq!(m, method);
        assert!(!matches!(inp, MockParams::Value(serde_json::Value::Null)));
        if std::mem::size_of::<T>() == 0 {
            assert!(matches!(inp, MockParams::Zst));
        } else if let MockParams::Value(inp) = inp {
            assert_eq!(serde_json::to_value(data)?, inp);
        } else {
            unreachable!("Zero sized types must be denoted with MockParams::Zst")
        }

        Ok(())
    }

    /// Pops the oldest recorded request, returning its method and JSON params
    pub fn take_request(&self) -> Option<(String, Value)> {
        lock(&self.requests).pop_front().map(|(method, params)| match params {
            MockParams::Value(value) => (method, value),
            MockParams::Zst => (method, Value::Null),
        })
    }

    /// Number of requests recorded and not yet asserted
    pub fn pending_requests(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Instantiates a mock transport
    pub fn new() -> Self {
        Self {
            requests: Arc::new(Mutex::new(VecDeque::new())),
            responses: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Pushes the data to the responses
    pub fn push<T: Serialize + Send + Sync, K: Borrow<T>>(&self, data: K) -> Result<(), MockError> {
        let value = serde_json::to_value(data.borrow())?;
        lock(&self.responses).push_back(MockResponse::Value(value));
        Ok(())
    }

    /// Pushes the data or error to the responses
    pub fn push_response(&self, response: MockResponse) {
        lock(&self.responses).push_back(response);
    }
}

#[derive(Error, Debug)]
/// Errors for the `MockProvider`
pub enum MockError {
    /// (De)Serialization error
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    /// The pushed response does not deserialize into the requested type
    #[error("malformed response: {0}")]
    MalformedResponse(#[source] serde_json::Error),

    /// Empty requests array
    #[error("empty requests array, please push some requests")]
    EmptyRequests,

    /// Empty responses array
    #[error("empty responses array, please push some responses")]
    EmptyResponses,

    /// Custom JsonRpcError
    #[error("JSON-RPC error: {0}")]
    JsonRpcError(super::JsonRpcError),

    /// Simulated transport failure
    #[error("transport error: {0}")]
    Transport(String),
}

impl crate::RpcError for MockError {
    fn as_error_response(&self) -> Option<&super::JsonRpcError> {
        match self {
            MockError::JsonRpcError(e) => Some(e),
            _ => None,
        }
    }

    fn as_serde_error(&self) -> Option<&serde_json::Error> {
        match self {
            MockError::SerdeJson(e) | MockError::MalformedResponse(e) => Some(e),
            _ => None,
        }
    }

    fn is_undecodable_response(&self) -> bool {
        matches!(self, MockError::MalformedResponse(_))
    }
}

impl From<MockError> for ProviderError {
    fn from(src: MockError) -> Self {
        ProviderError::JsonRpcClientError(Box::new(src))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::JsonRpcError;

    #[tokio::test]
    async fn pushes_request_and_response() {
        let mock = MockProvider::new();
        mock.push(12u64).unwrap();
        mock.push(13u64).unwrap();
        let first: u64 = mock.request("block_number", ()).await.unwrap();
        let second: u64 = mock.request("block_number", ["x"]).await.unwrap();
        mock.assert_request("block_number", ()).unwrap();
        mock.assert_request("block_number", ["x"]).unwrap();
        assert_eq!((first, second), (12, 13));
    }

    #[tokio::test]
    async fn empty_responses() {
        let mock = MockProvider::new();
        // tries to get a response without pushing a response
        let err = mock.request::<_, ()>("block_number", ()).await.unwrap_err();
        match err {
            MockError::EmptyResponses => {}
            _ => panic!("expected empty responses"),
        };
    }

    #[tokio::test]
    async fn pushes_error_response() {
        let mock = MockProvider::new();
        let error = JsonRpcError {
            code: -32603,
            data: Some(serde_json::json!("account not found")),
            message: "Internal error".to_string(),
        };
        mock.push_response(MockResponse::Error(error.clone()));

        let result: Result<u64, MockError> = mock.request("auth_account", ["goat1x"]).await;
        match result {
            Err(MockError::JsonRpcError(e)) => {
                assert_eq!(e.code, error.code);
                assert_eq!(e.message, error.message);
                assert_eq!(e.data, error.data);
            }
            _ => panic!("Expected JsonRpcError"),
        }
    }

    #[tokio::test]
    async fn transport_error_and_delay() {
        let mock = MockProvider::new();
        mock.push_response(MockResponse::Delayed(
            Duration::from_millis(5),
            Box::new(MockResponse::TransportError("connection refused".into())),
        ));
        let result: Result<u64, MockError> = mock.request("health", ()).await;
        assert!(matches!(result, Err(MockError::Transport(_))));
    }

    #[tokio::test]
    async fn empty_requests() {
        let mock = MockProvider::new();
        // tries to assert a request without making one
        let err = mock.assert_request("block_number", ()).unwrap_err();
        match err {
            MockError::EmptyRequests => {}
            _ => panic!("expected empty request"),
        };
    }
}
