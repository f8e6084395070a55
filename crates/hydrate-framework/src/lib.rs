//! # Hydrate Framework
//!
//! Building blocks for fetching, caching and handing over remote listing data
//! between a server-side render pass and the client that continues from it.
//!
//! ## Architecture Overview
//!
//! 1. **Payload Layer** ([`Payload`], [`ResourceQuery`]) - the uniform
//!    `{meta, data}` envelope and the fingerprint that keys it.
//! 2. **Cache Layer** ([`HydrationStore`]) - process-wide store that can be
//!    *hydrated* with server-rendered data and deduplicates in-flight fetches.
//! 3. **Gateway Layer** ([`GatewayActor`], [`GatewayClient`]) - builds request
//!    options, issues network calls through a [`Transport`] and resolves each
//!    call exactly once.
//! 4. **Handle** ([`ApiHandle`]) - store and gateway injected together, the
//!    `api` object pages receive.
//!
//! ## Resolve-Once Futures
//!
//! Everything that resolves asynchronously is handed out as a
//! [`Promise`], a cloneable shared future. Clones observe the same single
//! output and [`Promise::ptr_eq`] tells whether two callers share one fetch.
//!
//! ## Wiring
//!
//! ```rust
//! use hydrate_framework::{ApiHandle, ApiOptions, GatewayActor, HydrationStore, HttpTransport, GatewayConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = GatewayConfig::default();
//!     let transport = HttpTransport::new(&config).unwrap();
//!
//!     let (actor, client) = GatewayActor::new(config.buffer_size);
//!     let handle = tokio::spawn(actor.run(transport));
//!
//!     let api = ApiHandle::new(client, HydrationStore::new());
//!     let options = api.build_options(&ApiOptions::default().with_query("subreddit", "pics"), &Default::default());
//!     assert!(options.use_cache);
//!
//!     drop(api);
//!     handle.await.unwrap();
//! }
//! ```
//!
//! ## Testing
//!
//! See the [`mock`] module for a gateway that answers from expectations.

pub mod api;
pub mod client;
pub mod config;
pub mod deferred;
pub mod error;
pub mod gateway;
pub mod http;
pub mod message;
pub mod mock;
pub mod options;
pub mod payload;
pub mod store;
pub mod tracing;

pub use api::ApiHandle;
pub use client::GatewayClient;
pub use config::GatewayConfig;
pub use deferred::{PayloadPromise, Promise};
pub use error::{ConfigError, FetchError, HydrateError};
pub use gateway::{GatewayActor, Transport, FINGERPRINT_HEADER};
pub use http::HttpTransport;
pub use message::GatewayRequest;
pub use options::{build_options, ApiOptions, RequestOptions};
pub use payload::{Meta, Payload, ResourceKey, ResourceQuery};
pub use store::{EntryState, HydrateOutcome, HydrationStore, Origin};
