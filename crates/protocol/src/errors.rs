//! Error types for the FleetLock client.
//!
//! [`FleetLockError`] is the single failure type returned by every client
//! operation. Its variants keep the categories a caller may want to act on
//! apart: a bad configuration, a request that could not be built, a transport
//! that could not deliver, a server error body that could not be decoded, a
//! well-formed server refusal, and a status code outside the protocol.
//!
//! [`TransportError`] is the failure type of the [`crate::Transport`] port.
//! Transport implementations map their native errors onto it.

use thiserror::Error;

use crate::ErrorBody;

// ---------------------------------------------------------------------------
// Transport port errors
// ---------------------------------------------------------------------------

/// Failure reported by a [`crate::Transport`] implementation.
///
/// Covers both failing to deliver the request and failing to read the response
/// body afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// No connection could be established (DNS, refused, TLS handshake).
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The transport's configured timeout elapsed.
    #[error("Request timed out")]
    Timeout,

    /// The response body could not be read to completion.
    #[error("Failed to read response body: {0}")]
    Body(String),

    /// Any other transport failure.
    #[error("HTTP transport error: {0}")]
    Other(String),
}

// ---------------------------------------------------------------------------
// Error body decoding
// ---------------------------------------------------------------------------

/// Why a 3xx/4xx/5xx response body could not be turned into an [`ErrorBody`].
#[derive(Debug, Error)]
pub enum DecodeFailure {
    /// The body could not be read from the transport.
    #[error("reading body: {0}")]
    Read(#[source] TransportError),

    /// The body was read but is not a FleetLock error object.
    #[error("unmarshalling error: {0}")]
    Json(#[source] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Client errors
// ---------------------------------------------------------------------------

/// Errors returned by [`crate::FleetLockClient`].
///
/// No variant is recovered from inside the client; every failure reaches the
/// immediate caller.
#[derive(Debug, Error)]
pub enum FleetLockError {
    /// The server base URL is not an absolute URI with a scheme and authority.
    ///
    /// Produced only at construction time; no request is ever attempted.
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        /// Description of the configuration problem.
        message: String,
    },

    /// The request payload could not be serialised.
    ///
    /// The payload shape is fixed, so this indicates a defect rather than bad
    /// input.
    #[error("Failed to encode request payload: {source}")]
    Encoding {
        /// Underlying serialisation failure.
        #[source]
        source: serde_json::Error,
    },

    /// The request URL could not be assembled from the base URL and the
    /// operation path.
    #[error("Failed to build request for '{path}': {source}")]
    RequestBuild {
        /// Relative operation path that was being joined.
        path: &'static str,
        /// Underlying URL error.
        #[source]
        source: url::ParseError,
    },

    /// The transport could not deliver the request or receive a response.
    #[error("Transport error: {source}")]
    Transport {
        /// Failure reported by the transport.
        #[from]
        source: TransportError,
    },

    /// A 3xx/4xx/5xx response carried a body that is not a FleetLock error.
    #[error("Failed to decode error response (HTTP {status}): {source}")]
    ResponseDecode {
        /// HTTP status code of the response.
        status: u16,
        /// Read or decode failure, kept for diagnostics.
        #[source]
        source: DecodeFailure,
    },

    /// The service answered with a well-formed FleetLock error.
    ///
    /// The status code alone does not distinguish sub-cases; inspect
    /// [`ErrorBody::kind`] for that.
    #[error("fleetlock error: {message}")]
    Protocol {
        /// HTTP status code of the response.
        status: u16,
        /// The error body rendered as `kind: value`.
        message: String,
        /// The decoded error body.
        body: ErrorBody,
    },

    /// The response status is outside the 2xx–5xx classes.
    #[error("Unexpected status code: {status}")]
    UnexpectedStatus {
        /// Raw status code as received.
        status: u16,
    },
}

impl FleetLockError {
    /// Creates an [`FleetLockError::InvalidConfiguration`] error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Returns the HTTP status code when the failure came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ResponseDecode { status, .. }
            | Self::Protocol { status, .. }
            | Self::UnexpectedStatus { status } => Some(*status),
            _ => None,
        }
    }
}
