//! # Request Options
//!
//! Declarative query parameters a page hands to the gateway, and the pure
//! merge that turns them into the options of one concrete request.

use crate::payload::{fingerprint_params, ResourceKey, ResourceQuery};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Base options a page declares for its API calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiOptions {
    #[serde(default)]
    pub query: BTreeMap<String, String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl ApiOptions {
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

/// Options for a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    pub query: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub use_cache: bool,
}

impl RequestOptions {
    pub fn use_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    /// The cache query these options describe for `resource_type`.
    pub fn to_query(&self, resource_type: &str) -> ResourceQuery {
        ResourceQuery::new(resource_type, self.query.clone()).use_cache(self.use_cache)
    }

    pub fn fingerprint(&self, resource_type: &str) -> ResourceKey {
        ResourceKey {
            resource_type: resource_type.to_string(),
            params: fingerprint_params(&self.query),
        }
    }
}

/// Merges `base` with per-call `extra` query parameters. Per-call values win.
///
/// Pure: neither input is modified and nothing else is touched.
pub fn build_options(base: &ApiOptions, extra: &BTreeMap<String, String>) -> RequestOptions {
    let mut query = base.query.clone();
    query.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
    RequestOptions {
        query,
        headers: base.headers.clone(),
        use_cache: true,
    }
}
