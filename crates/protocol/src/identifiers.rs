//! Newtype identifiers for the FleetLock protocol.
//!
//! The node identifier and the reboot group are both plain strings on the
//! wire. Wrapping them in distinct newtypes prevents accidentally swapping the
//! two when building an [`crate::Identity`].
//!
//! Neither type validates its content. The remote service is the authority on
//! what a valid node id or group looks like; this layer passes values through
//! untouched (no trimming, no case folding, empty strings allowed).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct (serde-transparent), new(), as_str(), Display, From.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps the value verbatim.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }
    };
}

string_id! {
    /// Identifies the node asking for a reboot slot (e.g. a machine-id or a
    /// hostname). Serialised as `client_params.id`.
    NodeId
}

string_id! {
    /// A named partition of nodes. The server enforces per-group limits on how
    /// many nodes may reboot at once. Serialised as `client_params.group`.
    RebootGroup
}

// ---------------------------------------------------------------------------
// Invocation correlation
// ---------------------------------------------------------------------------

/// Identifies a single CLI invocation.
///
/// Generated fresh for every run and recorded on the root tracing span so all
/// log lines and exported spans from one invocation can be correlated. It is
/// never sent to the FleetLock server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvocationId(Uuid);

impl InvocationId {
    /// Generates a new random invocation identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an [`InvocationId`] from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for InvocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[path = "identifiers_tests.rs"]
mod tests;
