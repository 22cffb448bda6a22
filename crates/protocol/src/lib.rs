//! FleetLock reboot-coordination client.
//!
//! Before rebooting, a node asks a FleetLock server for a reboot slot
//! (`pre-reboot`); once it is back up and healthy it releases the slot
//! (`steady-state`). This crate builds those requests, sends them through a
//! [`Transport`], and turns the server's answer into `Ok(())` or a
//! [`FleetLockError`].
//!
//! ## Architectural Layer
//!
//! **Protocol + port definitions.** This crate has no I/O dependencies. The
//! network stack is supplied by an implementation of [`Transport`] (see the
//! `http-transport` crate).
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`NodeId`, `RebootGroup`, `InvocationId`) |
//! | [`types`] | Identity, endpoint, operations, and wire shapes |
//! | [`errors`] | `FleetLockError` and `TransportError` |
//! | [`transport`] | The `Transport` port |
//! | [`client`] | `FleetLockClient` and response classification |
//!
//! ## Example
//!
//! ```no_run
//! # async fn run(transport: impl protocol::Transport) -> Result<(), protocol::FleetLockError> {
//! use protocol::FleetLockClient;
//!
//! let client = FleetLockClient::new("https://fleetlock.example", "workers", "node-7", transport)?;
//! client.recursive_lock().await?;
//! // ... reboot, come back up ...
//! client.unlock_if_held().await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod errors;
pub mod identifiers;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod transport;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use client::{classify_response, FleetLockClient};
pub use errors::{DecodeFailure, FleetLockError, TransportError};
pub use identifiers::{InvocationId, NodeId, RebootGroup};
pub use transport::{
    OutboundRequest, Transport, TransportResponse, FLEET_LOCK_HEADER, FLEET_LOCK_HEADER_VALUE,
};
pub use types::{ClientParams, Endpoint, ErrorBody, Identity, Operation, Payload};
