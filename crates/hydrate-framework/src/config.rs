//! Gateway configuration parsed from environment variables.

use crate::error::ConfigError;

pub const DEFAULT_API_BASE_URL: &str = "https://www.reddit.com";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_GATEWAY_BUFFER: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub base_url: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub buffer_size: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            user_agent: default_user_agent(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            buffer_size: DEFAULT_GATEWAY_BUFFER,
        }
    }
}

impl GatewayConfig {
    /// Build typed gateway config from environment variables.
    ///
    /// All optional:
    /// - `LISTING_API_BASE_URL`: default `https://www.reddit.com`
    /// - `LISTING_USER_AGENT`: default `listing-client/<version>`
    /// - `LISTING_REQUEST_TIMEOUT_SECS`: default 30
    /// - `LISTING_CONNECT_TIMEOUT_SECS`: default 10
    /// - `LISTING_GATEWAY_BUFFER`: default 32
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup("LISTING_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let user_agent = lookup("LISTING_USER_AGENT").unwrap_or_else(default_user_agent);

        Ok(Self {
            base_url,
            user_agent,
            request_timeout_secs: parse_or(
                &lookup,
                "LISTING_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?,
            connect_timeout_secs: parse_or(
                &lookup,
                "LISTING_CONNECT_TIMEOUT_SECS",
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )?,
            buffer_size: parse_or(&lookup, "LISTING_GATEWAY_BUFFER", DEFAULT_GATEWAY_BUFFER)?,
        })
    }
}

fn default_user_agent() -> String {
    format!("listing-client/{}", env!("CARGO_PKG_VERSION"))
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            var: var.to_string(),
            value,
        }),
    }
}
