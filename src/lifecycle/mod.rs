//! # Runtime Lifecycle
//!
//! [`ClientRuntime`] is the dependency injection container of the client: it
//! creates the one process-wide [`HydrationStore`], starts the gateway actor
//! with its transport, and hands out the shared [`ApiHandle`] and
//! [`EventBus`] that page props carry.
//!
//! ## Shutdown
//!
//! The gateway actor stops when the last [`GatewayClient`](hydrate_framework::GatewayClient)
//! is dropped. Pages and props hold clones of the [`ApiHandle`], so drop them
//! before calling [`ClientRuntime::shutdown`], which then waits for requests
//! still in flight.

use crate::events::EventBus;
use crate::props::PageProps;
use hydrate_framework::{
    ApiHandle, ConfigError, GatewayActor, GatewayConfig, HttpTransport, HydrationStore, Transport,
};
use tokio::task::JoinHandle;
use tracing::{error, info};

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Gateway task failed: {0}")]
    Gateway(String),
}

pub struct ClientRuntime {
    pub api: ApiHandle,
    pub app: EventBus,
    handle: JoinHandle<()>,
}

impl ClientRuntime {
    /// Reads [`GatewayConfig`] from the environment and starts an HTTP-backed
    /// runtime.
    pub fn from_env() -> Result<Self, RuntimeError> {
        let config = GatewayConfig::from_env()?;
        Self::new(&config)
    }

    pub fn new(config: &GatewayConfig) -> Result<Self, RuntimeError> {
        let transport = HttpTransport::new(config)?;
        info!(base_url = %config.base_url, "Starting runtime");
        Ok(Self::with_transport(transport, config.buffer_size))
    }

    /// Starts a runtime over any transport. Must be called inside a Tokio
    /// runtime.
    pub fn with_transport<T: Transport>(transport: T, buffer_size: usize) -> Self {
        let (actor, client) = GatewayActor::new(buffer_size);
        let handle = tokio::spawn(actor.run(transport));
        Self {
            api: ApiHandle::new(client, HydrationStore::new()),
            app: EventBus::default(),
            handle,
        }
    }

    pub fn store(&self) -> &HydrationStore {
        self.api.store()
    }

    /// Fresh props for a subreddit page wired to this runtime.
    pub fn props(&self, subreddit_name: impl Into<String>) -> PageProps {
        PageProps::new(subreddit_name, self.api.clone(), self.app.clone())
    }

    pub async fn shutdown(self) -> Result<(), RuntimeError> {
        let Self { api, app, handle } = self;
        drop(api);
        drop(app);
        handle.await.map_err(|e| {
            error!(error = %e, "Gateway task failed");
            RuntimeError::Gateway(e.to_string())
        })?;
        info!("Runtime stopped");
        Ok(())
    }
}
