//! The FleetLock protocol client.
//!
//! [`FleetLockClient`] builds the request for an [`Operation`], sends it via
//! its [`Transport`], and classifies the response by status class:
//!
//! | Status | Outcome |
//! |--------|---------|
//! | 2xx | `Ok(())`, body drained unread |
//! | 3xx, 4xx, 5xx | body decoded as [`ErrorBody`] → [`FleetLockError::Protocol`], or [`FleetLockError::ResponseDecode`] |
//! | anything else | [`FleetLockError::UnexpectedStatus`] |
//!
//! Redirects, client errors and server errors are not told apart.
//! The server's error `kind` is the only discriminator.

use std::collections::BTreeMap;

use tracing::{debug, info, instrument, warn};

use crate::{
    DecodeFailure, Endpoint, ErrorBody, FleetLockError, Identity, NodeId, Operation,
    OutboundRequest, Payload, RebootGroup, Transport, TransportResponse, FLEET_LOCK_HEADER,
    FLEET_LOCK_HEADER_VALUE,
};

/// Client for a FleetLock reboot-coordination server.
///
/// The endpoint and identity are fixed at construction. Calls share no mutable
/// state, so one client can serve concurrent callers whenever `T` can.
#[derive(Debug, Clone)]
pub struct FleetLockClient<T> {
    endpoint: Endpoint,
    identity: Identity,
    transport: T,
}

impl<T: Transport> FleetLockClient<T> {
    /// Builds a client. No network traffic happens here.
    ///
    /// # Errors
    ///
    /// Returns [`FleetLockError::InvalidConfiguration`] if `base_url` is not an
    /// absolute URL with a scheme and host.
    pub fn new(
        base_url: &str,
        group: impl Into<RebootGroup>,
        id: impl Into<NodeId>,
        transport: T,
    ) -> Result<Self, FleetLockError> {
        let endpoint = Endpoint::parse(base_url)?;
        Ok(Self {
            endpoint,
            identity: Identity::new(id, group),
            transport,
        })
    }

    /// Returns the identity sent with every request.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Returns the validated server endpoint.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Returns the transport the client sends through.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Tries to reserve a reboot slot (`pre-reboot`).
    ///
    /// `Ok(())` means the node may reboot now. Any error means it must not; a
    /// [`FleetLockError::Protocol`] carries the server's reason.
    pub async fn recursive_lock(&self) -> Result<(), FleetLockError> {
        self.execute(Operation::PreReboot).await
    }

    /// Releases the reboot slot if this node holds one (`steady-state`).
    ///
    /// Safe to call repeatedly; whether anything was held is the server's call.
    pub async fn unlock_if_held(&self) -> Result<(), FleetLockError> {
        self.execute(Operation::SteadyState).await
    }

    /// Builds the request for `operation` without sending it.
    ///
    /// # Errors
    ///
    /// Returns [`FleetLockError::Encoding`] or [`FleetLockError::RequestBuild`].
    pub fn build_request(&self, operation: Operation) -> Result<OutboundRequest, FleetLockError> {
        let body = serde_json::to_vec(&Payload::from(&self.identity))
            .map_err(|source| FleetLockError::Encoding { source })?;
        let url = self.endpoint.url_for(operation)?;

        let mut headers = BTreeMap::new();
        headers.insert(
            FLEET_LOCK_HEADER.to_string(),
            FLEET_LOCK_HEADER_VALUE.to_string(),
        );

        Ok(OutboundRequest {
            method: "POST",
            url,
            headers,
            body,
        })
    }

    #[instrument(
        name = "fleetlock.request",
        skip_all,
        fields(
            operation = %operation,
            group = %self.identity.group(),
            id = %self.identity.id(),
        )
    )]
    async fn execute(&self, operation: Operation) -> Result<(), FleetLockError> {
        let request = self.build_request(operation)?;
        debug!(url = %request.url, "sending request");

        let response = self.transport.send(request).await.map_err(|e| {
            warn!(error = %e, "transport failure");
            FleetLockError::from(e)
        })?;

        match classify_response(response).await {
            Ok(()) => {
                info!("request accepted");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, status = ?e.status(), "request refused");
                Err(e)
            }
        }
    }
}

/// Turns a response into an outcome by status class.
///
/// The body is read on every path, so the connection is always released.
pub async fn classify_response(
    mut response: Box<dyn TransportResponse>,
) -> Result<(), FleetLockError> {
    let status = response.status();

    match status / 100 {
        2 => {
            drain(response.as_mut()).await;
            Ok(())
        }
        3..=5 => {
            let body = response
                .read_body()
                .await
                .map_err(|e| FleetLockError::ResponseDecode {
                    status,
                    source: DecodeFailure::Read(e),
                })?;

            let error: ErrorBody =
                serde_json::from_slice(&body).map_err(|e| FleetLockError::ResponseDecode {
                    status,
                    source: DecodeFailure::Json(e),
                })?;

            Err(FleetLockError::Protocol {
                status,
                message: error.to_string(),
                body: error,
            })
        }
        _ => {
            drain(response.as_mut()).await;
            Err(FleetLockError::UnexpectedStatus { status })
        }
    }
}

async fn drain(response: &mut dyn TransportResponse) {
    if let Err(e) = response.read_body().await {
        debug!(error = %e, "failed to drain response body");
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
