//! FleetLock HTTP transport adapter.
//!
//! Implements the [`protocol::Transport`] trait with [`reqwest`] (rustls TLS).
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Connection pooling, TLS, proxies and timeouts all live
//! here. The [`protocol`] crate sees only [`protocol::Transport`].
//!
//! The adapter sends exactly the headers the request carries. `reqwest` adds
//! only the framing headers HTTP needs (`host`, `content-length`); no
//! `content-type` or `user-agent` is added unless configured.

use std::time::Duration;

use async_trait::async_trait;
use protocol::{OutboundRequest, Transport, TransportError, TransportResponse};
use tracing::{debug, instrument};

/// Settings for [`ReqwestTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpTransportConfig {
    /// Whole-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Timeout for establishing the TCP/TLS connection.
    pub connect_timeout: Option<Duration>,
    /// Value for the `user-agent` header. `None` sends no such header.
    pub user_agent: Option<String>,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            connect_timeout: Some(Duration::from_secs(10)),
            user_agent: None,
        }
    }
}

/// [`Transport`] backed by a pooled [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds a transport from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Other`] if the TLS backend cannot be
    /// initialised.
    pub fn new(config: &HttpTransportConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(connect_timeout) = config.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }

        let client = builder
            .build()
            .map_err(|e| TransportError::Other(format!("building HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wraps an existing client, e.g. one shared with other subsystems.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(name = "http.send", skip_all, fields(method = request.method, url = %request.url))]
    async fn send(
        &self,
        request: OutboundRequest,
    ) -> Result<Box<dyn TransportResponse>, TransportError> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|e| TransportError::Other(format!("invalid method: {e}")))?;

        let mut builder = self.client.request(method, request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .body(request.body)
            .send()
            .await
            .map_err(map_error)?;
        debug!(status = response.status().as_u16(), "response received");

        Ok(Box::new(ReqwestResponse { inner: response }))
    }
}

struct ReqwestResponse {
    inner: reqwest::Response,
}

#[async_trait]
impl TransportResponse for ReqwestResponse {
    fn status(&self) -> u16 {
        self.inner.status().as_u16()
    }

    async fn read_body(&mut self) -> Result<Vec<u8>, TransportError> {
        let mut body = Vec::new();
        while let Some(chunk) = self.inner.chunk().await.map_err(map_error)? {
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

fn map_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else if error.is_connect() {
        TransportError::ConnectionFailed(error_chain(&error))
    } else if error.is_body() || error.is_decode() {
        TransportError::Body(error_chain(&error))
    } else {
        TransportError::Other(error_chain(&error))
    }
}

// reqwest's Display omits the underlying cause (e.g. "connection refused").
fn error_chain(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
