//! # API Handle
//!
//! [`ApiHandle`] is the `api` object a page receives in its props: the
//! gateway client and the shared store, injected together. It is the only
//! place where the two meet, so pages never reach into either directly.

use crate::client::GatewayClient;
use crate::deferred::PayloadPromise;
use crate::error::HydrateError;
use crate::options::{ApiOptions, RequestOptions};
use crate::payload::Payload;
use crate::store::{HydrateOutcome, HydrationStore};
use std::collections::BTreeMap;
use tracing::instrument;

#[derive(Clone, Debug)]
pub struct ApiHandle {
    client: GatewayClient,
    store: HydrationStore,
}

impl ApiHandle {
    pub fn new(client: GatewayClient, store: HydrationStore) -> Self {
        Self { client, store }
    }

    pub fn store(&self) -> &HydrationStore {
        &self.store
    }

    pub fn build_options(
        &self,
        base: &ApiOptions,
        extra: &BTreeMap<String, String>,
    ) -> RequestOptions {
        self.client.build_options(base, extra)
    }

    /// Seeds the store with server-rendered data for `resource_type`.
    pub fn hydrate(
        &self,
        resource_type: &str,
        options: &RequestOptions,
        payload: &Payload,
    ) -> Result<HydrateOutcome, HydrateError> {
        self.store.hydrate(&options.to_query(resource_type), payload)
    }

    /// Drops the cached (or in-flight) entry for these options.
    pub fn invalidate(&self, resource_type: &str, options: &RequestOptions) -> bool {
        self.store.invalidate(&options.to_query(resource_type))
    }

    /// Loads a resource through the store: cached or joined when
    /// `options.use_cache`, always a fresh gateway request otherwise.
    #[instrument(skip(self, options), fields(use_cache = options.use_cache))]
    pub fn get(&self, resource_type: &str, options: RequestOptions) -> PayloadPromise {
        let query = options.to_query(resource_type);
        let client = self.client.clone();
        let resource_type = resource_type.to_string();
        self.store.load(&query, move || async move {
            client.request(&resource_type, options).await
        })
    }
}
