//! # Gateway Messages
//!
//! The message type sent from a [`GatewayClient`](crate::client::GatewayClient)
//! to the [`GatewayActor`](crate::gateway::GatewayActor).

use crate::error::FetchError;
use crate::options::RequestOptions;
use crate::payload::Payload;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by the gateway.
pub type Response<T> = oneshot::Sender<Result<T, FetchError>>;

/// One fetch of one resource. The actor answers on `respond_to` exactly once.
#[derive(Debug)]
pub struct GatewayRequest {
    pub resource_type: String,
    pub options: RequestOptions,
    pub respond_to: Response<Payload>,
}
