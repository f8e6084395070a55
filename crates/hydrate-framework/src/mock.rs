//! # Mock Gateway & Testing Guide
//!
//! [`MockGateway`] hands out a real [`GatewayClient`] whose requests are
//! answered in-memory from a queue of expectations. Code under test talks to
//! the gateway exactly as it would in production, while the test controls
//! every response and can count the calls that were made.
//!
//! ## When to use which helper
//!
//! | Helper | Use Case |
//! |--------|----------|
//! | [`MockGateway`] | Fluent expectations, call counting, `verify()` |
//! | [`create_mock_gateway`] + [`next_request`] | Holding a response open to test what happens *while* a request is in flight |
//! | [`GatewayActor`](crate::gateway::GatewayActor) with a custom [`Transport`](crate::gateway::Transport) | Testing the actor itself |
//!
//! ## Example
//!
//! ```rust
//! use hydrate_framework::mock::MockGateway;
//! use hydrate_framework::{ApiOptions, FetchError, Payload};
//! use std::collections::BTreeMap;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockGateway::new();
//!     mock.expect_request("subreddits")
//!         .return_ok(Payload::from_value(serde_json::json!({ "subscribers": 1 })));
//!     mock.expect_request("subreddits")
//!         .return_err(FetchError::Server { status: 500 });
//!
//!     let client = mock.client();
//!     let options = client.build_options(&ApiOptions::default(), &BTreeMap::new());
//!
//!     assert!(client.request("subreddits", options.clone()).await.is_ok());
//!     assert!(matches!(
//!         client.request("subreddits", options).await,
//!         Err(FetchError::Server { status: 500 })
//!     ));
//!     assert_eq!(mock.call_count(), 2);
//!     mock.verify();
//! }
//! ```

use crate::api::ApiHandle;
use crate::client::GatewayClient;
use crate::error::FetchError;
use crate::message::GatewayRequest;
use crate::options::RequestOptions;
use crate::payload::Payload;
use crate::store::HydrationStore;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

struct Expectation {
    resource_type: String,
    response: Result<Payload, FetchError>,
}

/// A request the mock has served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub resource_type: String,
    pub options: RequestOptions,
}

/// A mock gateway with expectation tracking.
pub struct MockGateway {
    client: GatewayClient,
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGateway {
    /// Creates a mock with no expectations. Must be called inside a Tokio
    /// runtime.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<GatewayRequest>(100);
        let expectations = Arc::new(Mutex::new(VecDeque::<Expectation>::new()));
        let requests = Arc::new(Mutex::new(Vec::new()));
        let expectations_clone = expectations.clone();
        let requests_clone = requests.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let GatewayRequest {
                    resource_type,
                    options,
                    respond_to,
                } = request;
                requests_clone.lock().unwrap().push(RecordedRequest {
                    resource_type: resource_type.clone(),
                    options,
                });
                let expectation = expectations_clone.lock().unwrap().pop_front();

                match expectation {
                    Some(expectation) if expectation.resource_type == resource_type => {
                        let _ = respond_to.send(expectation.response);
                    }
                    _ => {
                        panic!("Unexpected request for {resource_type} or expectation mismatch");
                    }
                }
            }
        });

        Self {
            client: GatewayClient::new(sender),
            expectations,
            requests,
            _handle: handle,
        }
    }

    /// Returns the client for use in tests.
    pub fn client(&self) -> GatewayClient {
        self.client.clone()
    }

    /// An [`ApiHandle`] over this mock and the given store.
    pub fn api(&self, store: HydrationStore) -> ApiHandle {
        ApiHandle::new(self.client(), store)
    }

    /// Expects one request for `resource_type`.
    pub fn expect_request(&mut self, resource_type: impl Into<String>) -> RequestExpectationBuilder {
        RequestExpectationBuilder {
            resource_type: resource_type.into(),
            expectations: self.expectations.clone(),
        }
    }

    /// Number of requests received so far.
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }
}

/// Builder for request expectations.
pub struct RequestExpectationBuilder {
    resource_type: String,
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
}

impl RequestExpectationBuilder {
    /// Sets the expectation to return a payload.
    pub fn return_ok(self, payload: Payload) {
        self.push(Ok(payload));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: FetchError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<Payload, FetchError>) {
        self.expectations.lock().unwrap().push_back(Expectation {
            resource_type: self.resource_type,
            response,
        });
    }
}

// =============================================================================
// CHANNEL HELPERS
// =============================================================================

/// Creates a gateway client and the receiver its requests arrive on.
///
/// Nothing answers automatically: the test pulls each request with
/// [`next_request`] and replies on `respond_to` whenever it chooses, which
/// makes it possible to observe callers while a request is still pending.
pub fn create_mock_gateway(buffer_size: usize) -> (GatewayClient, mpsc::Receiver<GatewayRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (GatewayClient::new(sender), receiver)
}

/// Waits for the next request sent to a client from [`create_mock_gateway`].
pub async fn next_request(receiver: &mut mpsc::Receiver<GatewayRequest>) -> Option<GatewayRequest> {
    receiver.recv().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{build_options, ApiOptions};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn options() -> RequestOptions {
        build_options(
            &ApiOptions::default().with_query("subreddit", "pics"),
            &BTreeMap::new(),
        )
    }

    #[tokio::test]
    async fn test_channel_helpers_let_test_answer() {
        let (client, mut receiver) = create_mock_gateway(4);

        let task = tokio::spawn(async move { client.request("subreddits", options()).await });

        let request = next_request(&mut receiver)
            .await
            .expect("Expected a gateway request");
        assert_eq!(request.resource_type, "subreddits");
        assert_eq!(request.options.query.get("subreddit").map(String::as_str), Some("pics"));
        request
            .respond_to
            .send(Ok(Payload::from_value(json!({ "subscribers": 2 }))))
            .unwrap();

        let result = task.await.unwrap().unwrap();
        assert!(result.is_populated());
    }

    #[tokio::test]
    async fn test_mock_gateway_with_expectations() {
        let mut mock = MockGateway::new();
        mock.expect_request("subreddits")
            .return_ok(Payload::from_value(json!({ "subscribers": 10 })));

        let client = mock.client();
        let payload = client.request("subreddits", options()).await.unwrap();
        assert_eq!(payload.data.unwrap()["subscribers"], 10);

        assert_eq!(mock.call_count(), 1);
        assert_eq!(mock.requests()[0].resource_type, "subreddits");
        mock.verify();
    }
}
