//! The transport port.
//!
//! [`FleetLockClient`](crate::FleetLockClient) never touches the network
//! itself. It hands a fully-formed [`OutboundRequest`] to a [`Transport`] and
//! gets back a [`TransportResponse`] whose body it reads only when it needs
//! to. The production implementation lives in the `http-transport` crate;
//! tests use [`crate::testing::MockTransport`].
//!
//! Timeouts are the transport's concern. The client imposes none.

use std::collections::BTreeMap;

use async_trait::async_trait;
use url::Url;

use crate::TransportError;

/// Name of the marker header every FleetLock request carries.
pub const FLEET_LOCK_HEADER: &str = "fleet-lock-protocol";

/// Value of [`FLEET_LOCK_HEADER`].
pub const FLEET_LOCK_HEADER_VALUE: &str = "true";

/// A request ready to be put on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    /// HTTP method. Always `POST` for FleetLock.
    pub method: &'static str,
    /// Absolute target URL.
    pub url: Url,
    /// The complete header set. Transports must not drop entries; they may add
    /// the framing headers HTTP itself requires (`host`, `content-length`).
    pub headers: BTreeMap<String, String>,
    /// Serialised JSON payload.
    pub body: Vec<u8>,
}

/// A response whose body has not been read yet.
#[async_trait]
pub trait TransportResponse: Send {
    /// HTTP status code.
    fn status(&self) -> u16;

    /// Reads the remaining body to completion.
    ///
    /// Reading the body also releases the underlying connection, so callers
    /// drain it even when they ignore its content.
    async fn read_body(&mut self) -> Result<Vec<u8>, TransportError>;
}

/// Sends FleetLock requests.
///
/// Implementations must be safe to share between tasks; the client holds no
/// per-call state of its own.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Delivers `request` and returns the response head.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when no response could be obtained.
    async fn send(
        &self,
        request: OutboundRequest,
    ) -> Result<Box<dyn TransportResponse>, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn send(
        &self,
        request: OutboundRequest,
    ) -> Result<Box<dyn TransportResponse>, TransportError> {
        (**self).send(request).await
    }
}
