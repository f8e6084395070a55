//! # Gateway Actor
//!
//! The server half of the API Fetch Gateway. [`GatewayActor`] owns the
//! receiving end of the request channel and hands each request to an injected
//! [`Transport`] in its own task, so a slow response never blocks the next
//! request. The transport is supplied to [`GatewayActor::run`] rather than to
//! the constructor, which lets tests and the runtime wire different transports
//! into the same actor.
//!
//! Before a request reaches the transport it is tagged with its resource
//! fingerprint, both as the [`FINGERPRINT_HEADER`] header and as the
//! `fingerprint` field of the request's tracing span.

use crate::client::GatewayClient;
use crate::error::FetchError;
use crate::message::GatewayRequest;
use crate::options::RequestOptions;
use crate::payload::Payload;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, info_span, warn, Instrument};

/// Header carrying the resource fingerprint on every outgoing request.
pub const FINGERPRINT_HEADER: &str = "x-resource-fingerprint";

/// Performs the actual network call for one request.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn send(
        &self,
        resource_type: &str,
        options: &RequestOptions,
    ) -> Result<Payload, FetchError>;
}

pub struct GatewayActor {
    receiver: mpsc::Receiver<GatewayRequest>,
    next_id: u64,
}

impl GatewayActor {
    /// Creates the actor and its client.
    ///
    /// `buffer_size` is the capacity of the request channel; when it is full,
    /// client calls wait for space.
    pub fn new(buffer_size: usize) -> (Self, GatewayClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            next_id: 1,
        };
        (actor, GatewayClient::new(sender))
    }

    /// Serves requests until every client has been dropped, then waits for
    /// the requests still in flight.
    pub async fn run<T: Transport>(mut self, transport: T) {
        let transport = Arc::new(transport);
        let mut in_flight = JoinSet::new();
        info!("Gateway started");

        while let Some(request) = self.receiver.recv().await {
            let GatewayRequest {
                resource_type,
                mut options,
                respond_to,
            } = request;
            let id = self.next_id;
            self.next_id += 1;

            let fingerprint = options.fingerprint(&resource_type).to_string();
            options
                .headers
                .insert(FINGERPRINT_HEADER.to_string(), fingerprint.clone());

            let span = info_span!("request", id, %resource_type, %fingerprint);
            let transport = transport.clone();
            in_flight.spawn(
                async move {
                    debug!(?options, "Sending");
                    let result = transport.send(&resource_type, &options).await;
                    match &result {
                        Ok(_) => info!("Request ok"),
                        Err(e) => warn!(error = %e, "Request failed"),
                    }
                    if respond_to.send(result).is_err() {
                        debug!("Requester gone");
                    }
                }
                .instrument(span),
            );

            while in_flight.try_join_next().is_some() {}
        }

        while in_flight.join_next().await.is_some() {}
        info!(served = self.next_id - 1, "Gateway shutdown");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{build_options, ApiOptions};
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    /// Records what it was asked for and answers from a fixed result.
    struct Recording {
        seen: Arc<Mutex<Vec<(String, RequestOptions)>>>,
        result: Result<Payload, FetchError>,
    }

    #[async_trait]
    impl Transport for Recording {
        async fn send(
            &self,
            resource_type: &str,
            options: &RequestOptions,
        ) -> Result<Payload, FetchError> {
            self.seen
                .lock()
                .unwrap()
                .push((resource_type.to_string(), options.clone()));
            self.result.clone()
        }
    }

    fn pics_options() -> RequestOptions {
        build_options(
            &ApiOptions::default().with_query("subreddit", "pics"),
            &BTreeMap::new(),
        )
    }

    #[tokio::test]
    async fn test_request_is_tagged_with_fingerprint() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let payload = Payload::from_value(json!({ "subscribers": 100 }));
        let (actor, client) = GatewayActor::new(4);
        let handle = tokio::spawn(actor.run(Recording {
            seen: seen.clone(),
            result: Ok(payload.clone()),
        }));

        let result = client.request("subreddits", pics_options()).await;
        assert_eq!(result, Ok(payload));

        drop(client);
        handle.await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let (resource_type, options) = &seen[0];
        assert_eq!(resource_type, "subreddits");
        let expected = pics_options().fingerprint("subreddits").to_string();
        assert_eq!(options.headers.get(FINGERPRINT_HEADER), Some(&expected));
    }

    #[tokio::test]
    async fn test_transport_error_is_delivered_once() {
        let (actor, client) = GatewayActor::new(4);
        tokio::spawn(actor.run(Recording {
            seen: Arc::new(Mutex::new(Vec::new())),
            result: Err(FetchError::Server { status: 500 }),
        }));

        let result = client.request("subreddits", pics_options()).await;
        assert_eq!(result, Err(FetchError::Server { status: 500 }));
    }

    #[tokio::test]
    async fn test_closed_gateway_is_a_network_error() {
        let (actor, client) = GatewayActor::new(1);
        drop(actor);
        let result = client.request("subreddits", pics_options()).await;
        assert!(matches!(result, Err(FetchError::Network(_))));
    }
}
