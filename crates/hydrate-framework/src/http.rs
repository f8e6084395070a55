//! HTTP transport for the gateway.
//!
//! Thin reqwest wrapper: `GET {base_url}/{resource_type}.json` with the
//! request's query and headers. Envelope parsing lives in [`parse_envelope`]
//! so it can be tested without a server.

use crate::config::GatewayConfig;
use crate::error::{ConfigError, FetchError};
use crate::gateway::Transport;
use crate::options::RequestOptions;
use crate::payload::Payload;
use async_trait::async_trait;
use std::time::Duration;

pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &GatewayConfig) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| ConfigError::HttpClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    pub fn url_for(&self, resource_type: &str) -> String {
        format!("{}/{}.json", self.base_url, resource_type)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        resource_type: &str,
        options: &RequestOptions,
    ) -> Result<Payload, FetchError> {
        let mut request = self.http.get(self.url_for(resource_type)).query(&options.query);
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status >= 400 {
            return Err(FetchError::Server { status });
        }

        let text = response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        parse_envelope(&text)
    }
}

/// Parses a `{ meta?, data }` envelope. A missing or empty `data` object is a
/// decode error: the gateway never resolves with a partial payload.
pub fn parse_envelope(body: &str) -> Result<Payload, FetchError> {
    let payload: Payload =
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;
    if !payload.is_populated() {
        return Err(FetchError::Decode("envelope has no data".to_string()));
    }
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_envelope_with_meta() {
        let body = r#"{
            "meta": { "tracking": "https://pixel.example/t.gif" },
            "data": { "subscribers": 100, "accounts_active": 5, "description_html": "<p>hi</p>" },
            "kind": "t5"
        }"#;
        let payload = parse_envelope(body).unwrap();
        assert_eq!(payload.tracking(), Some("https://pixel.example/t.gif"));
        let data = payload.data.unwrap();
        assert_eq!(data["accounts_active"], 5);
        assert_eq!(data["description_html"], "<p>hi</p>");
    }

    #[test]
    fn test_parse_envelope_requires_data() {
        assert!(matches!(
            parse_envelope(r#"{ "meta": {} }"#),
            Err(FetchError::Decode(_))
        ));
        assert!(matches!(
            parse_envelope(r#"{ "data": [1, 2] }"#),
            Err(FetchError::Decode(_))
        ));
        assert!(matches!(parse_envelope("<html>"), Err(FetchError::Decode(_))));
        assert!(matches!(
            parse_envelope(r#"{ "meta": { "tracking": "t" }, "data": {} }"#),
            Err(FetchError::Decode(_))
        ));
    }

    #[test]
    fn test_url_for_resource() {
        let config = GatewayConfig {
            base_url: "http://localhost:9000".to_string(),
            ..GatewayConfig::default()
        };
        let transport = HttpTransport::new(&config).unwrap();
        assert_eq!(transport.url_for("subreddits"), "http://localhost:9000/subreddits.json");
    }
}
