//! # Framework Errors
//!
//! This module defines the error types shared by the store, the gateway and
//! everything built on top of them. Fetch errors are `Clone` because a single
//! in-flight request can be awaited by many consumers, and every one of them
//! must observe the same failure.

use crate::payload::ResourceKey;

/// Failures of a single gateway request.
///
/// Exactly one of these (or a payload) is delivered per request; there is no
/// partial delivery.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The request never produced a response (connect failure, timeout,
    /// gateway task gone).
    #[error("Network error: {0}")]
    Network(String),

    /// The response body was not a valid `{meta, data}` envelope.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The server answered with a non-success status.
    #[error("Server error: status {status}")]
    Server { status: u16 },
}

impl FetchError {
    /// Status code for [`FetchError::Server`], `None` otherwise.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status } => Some(*status),
            _ => None,
        }
    }
}

/// Failures of [`HydrationStore::hydrate`](crate::store::HydrationStore::hydrate).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HydrateError {
    /// The payload carries no `data`; the entry was left untouched.
    #[error("Invalid payload for {key}: missing data")]
    InvalidPayload { key: ResourceKey },
}

/// Errors raised while reading configuration from the environment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    Invalid { var: String, value: String },

    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_only_for_server_errors() {
        assert_eq!(FetchError::Server { status: 502 }.status(), Some(502));
        assert_eq!(FetchError::Network("timed out".into()).status(), None);
        assert_eq!(FetchError::Decode("bad json".into()).status(), None);
    }
}
