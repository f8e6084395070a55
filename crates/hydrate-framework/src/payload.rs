//! # Payloads & Queries
//!
//! The uniform `{meta, data}` envelope every resource resolves to, and the
//! query type that identifies a fetchable resource instance.
//!
//! A [`ResourceQuery`] reduces to a [`ResourceKey`] (its *fingerprint*): the
//! resource type plus a deterministic serialization of the query parameters.
//! Two queries with the same parameters in a different insertion order share
//! a key, because parameters live in a `BTreeMap`.

use crate::error::FetchError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt::Display;

/// Telemetry carried next to the resource data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking: Option<String>,
}

/// The resolved value of a resource request.
///
/// `data` holds the resource-specific fields. A payload counts as
/// *populated* only when `data` is present and non-empty; an empty object is
/// treated exactly like a missing one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
}

impl Payload {
    /// Creates a payload from resource fields, without meta.
    pub fn new(data: Map<String, Value>) -> Self {
        Self {
            meta: None,
            data: Some(data),
        }
    }

    /// Builds a payload from a JSON object literal. Non-object values yield
    /// an unpopulated payload.
    pub fn from_value(data: Value) -> Self {
        match data {
            Value::Object(map) => Self::new(map),
            _ => Self::default(),
        }
    }

    /// Attaches a tracking url.
    pub fn with_tracking(mut self, url: impl Into<String>) -> Self {
        self.meta = Some(Meta {
            tracking: Some(url.into()),
        });
        self
    }

    pub fn is_populated(&self) -> bool {
        self.data.as_ref().is_some_and(|data| !data.is_empty())
    }

    pub fn tracking(&self) -> Option<&str> {
        self.meta.as_ref()?.tracking.as_deref()
    }

    /// Deserializes `data` into a typed resource view.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, FetchError> {
        let data = self
            .data
            .as_ref()
            .ok_or_else(|| FetchError::Decode("missing data".to_string()))?;
        serde_json::from_value(Value::Object(data.clone()))
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}

/// Cache key: `(resource_type, serialized params)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey {
    pub resource_type: String,
    pub params: String,
}

impl Display for ResourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.resource_type, self.params)
    }
}

/// Identifies a fetchable resource instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceQuery {
    pub resource_type: String,
    pub params: BTreeMap<String, String>,
    pub use_cache: bool,
}

impl ResourceQuery {
    pub fn new(resource_type: impl Into<String>, params: BTreeMap<String, String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            params,
            use_cache: true,
        }
    }

    pub fn use_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    /// Returns the fingerprint of this query. `use_cache` is not part of it.
    pub fn key(&self) -> ResourceKey {
        ResourceKey {
            resource_type: self.resource_type.clone(),
            params: fingerprint_params(&self.params),
        }
    }
}

/// Serializes parameters as a JSON object with sorted keys.
pub fn fingerprint_params(params: &BTreeMap<String, String>) -> String {
    let object: Map<String, Value> = params
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    Value::Object(object).to_string()
}
