//! `reqwest`-backed transport.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument};

use super::Transport;
use crate::config::TransportConfig;
use crate::error::{GateError, Result};

/// HTTP transport posting JSON documents with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    signature_header: Option<String>,
}

impl HttpTransport {
    /// Build a transport from configuration.
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            signature_header: config.signature_header.clone(),
        })
    }

    /// Use an existing client, e.g. one shared with the rest of the process.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            signature_header: None,
        }
    }

    /// Send the signature in `header` with every request.
    pub fn with_signature_header(mut self, header: impl Into<String>) -> Self {
        self.signature_header = Some(header.into());
        self
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, body, signature), fields(bytes = body.len()))]
    async fn post_json(&self, endpoint: &str, body: Vec<u8>, signature: &str) -> Result<String> {
        let url = reqwest::Url::parse(endpoint)
            .map_err(|e| GateError::Transport(format!("invalid endpoint {}: {}", endpoint, e)))?;

        let mut request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body);

        if let Some(ref header) = self.signature_header {
            request = request.header(header.as_str(), signature);
        }

        let response = request.send().await?;
        let status = response.status();
        debug!(status = %status, "Registration service responded");

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_from_config() {
        let config = TransportConfig {
            timeout_ms: Some(500),
            signature_header: Some("X-Signature".to_string()),
            ..TransportConfig::default()
        };
        let transport = HttpTransport::new(&config).unwrap();
        assert_eq!(transport.signature_header.as_deref(), Some("X-Signature"));
    }

    #[tokio::test]
    async fn test_malformed_endpoint_is_transport_error() {
        let transport = HttpTransport::new(&TransportConfig::default()).unwrap();

        let err = transport
            .post_json("not a url", b"{}".to_vec(), "")
            .await
            .unwrap_err();

        assert!(matches!(err, GateError::Transport(_)));
    }

    #[tokio::test]
    #[ignore] // Requires network access to the registration service
    async fn test_post_to_default_endpoint() {
        let config = TransportConfig::default();
        let transport = HttpTransport::new(&config).unwrap();
        let result = transport.post_json(&config.endpoint, b"{}".to_vec(), "").await;
        assert!(result.is_ok());
    }
}
