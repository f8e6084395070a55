//! # Gateway Client
//!
//! This module defines the client half of the API Fetch Gateway.

use crate::error::FetchError;
use crate::message::GatewayRequest;
use crate::options::{build_options, ApiOptions, RequestOptions};
use crate::payload::Payload;
use std::collections::BTreeMap;
use tokio::sync::{mpsc, oneshot};

/// ## GatewayClient
///
/// Type-safe async handle for the [`GatewayActor`](crate::gateway::GatewayActor).
/// It forwards each request over a Tokio mpsc channel and awaits the answer on a
/// oneshot channel, so every call resolves exactly once.
///
/// * **Cloneable** – holds only a sender, so cloning is inexpensive.
/// * **Closed gateway** – surfaces as [`FetchError::Network`].
#[derive(Clone, Debug)]
pub struct GatewayClient {
    sender: mpsc::Sender<GatewayRequest>,
}

impl GatewayClient {
    pub fn new(sender: mpsc::Sender<GatewayRequest>) -> Self {
        Self { sender }
    }

    /// See [`build_options`].
    pub fn build_options(
        &self,
        base: &ApiOptions,
        extra: &BTreeMap<String, String>,
    ) -> RequestOptions {
        build_options(base, extra)
    }

    pub async fn request(
        &self,
        resource_type: &str,
        options: RequestOptions,
    ) -> Result<Payload, FetchError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(GatewayRequest {
                resource_type: resource_type.to_string(),
                options,
                respond_to,
            })
            .await
            .map_err(|_| FetchError::Network("gateway closed".to_string()))?;
        response
            .await
            .map_err(|_| FetchError::Network("gateway dropped response".to_string()))?
    }
}
