//! Value types of the FleetLock protocol.
//!
//! [`Identity`] and [`Endpoint`] are fixed when a client is built. [`Payload`]
//! and [`ErrorBody`] are the transient wire shapes built or decoded per call.
//! Their serde field names are the wire contract with the server and must not
//! change.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{FleetLockError, NodeId, RebootGroup};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Who is asking: the node identifier and its reboot group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    id: NodeId,
    group: RebootGroup,
}

impl Identity {
    /// Creates an identity. Both values are kept exactly as given.
    pub fn new(id: impl Into<NodeId>, group: impl Into<RebootGroup>) -> Self {
        Self {
            id: id.into(),
            group: group.into(),
        }
    }

    /// Returns the node identifier.
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Returns the reboot group.
    pub fn group(&self) -> &RebootGroup {
        &self.group
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// The two FleetLock operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Acquire a reboot slot before rebooting.
    PreReboot,
    /// Release any held slot once the node is back in steady state.
    SteadyState,
}

impl Operation {
    /// Relative path of the operation, joined onto the server base URL.
    pub fn path(self) -> &'static str {
        match self {
            Self::PreReboot => "v1/pre-reboot",
            Self::SteadyState => "v1/steady-state",
        }
    }

    /// Protocol name of the operation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PreReboot => "pre-reboot",
            Self::SteadyState => "steady-state",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Endpoint
// ---------------------------------------------------------------------------

/// Validated base URL of a FleetLock server.
///
/// The stored URL always has a path ending in `/`, so joining an operation
/// path appends to it instead of replacing its last segment. Both
/// `https://host/prefix` and `https://host/prefix/` resolve the acquire
/// operation to `https://host/prefix/v1/pre-reboot`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base: Url,
}

impl Endpoint {
    /// Parses and validates a base URL.
    ///
    /// # Errors
    ///
    /// Returns [`FleetLockError::InvalidConfiguration`] unless `raw` is an
    /// absolute URL with both a scheme and a host.
    pub fn parse(raw: &str) -> Result<Self, FleetLockError> {
        let mut base = Url::parse(raw).map_err(|e| {
            FleetLockError::invalid_configuration(format!("parsing URL '{raw}': {e}"))
        })?;

        if base.cannot_be_a_base() || base.host_str().map_or(true, str::is_empty) {
            return Err(FleetLockError::invalid_configuration(format!(
                "parsing URL '{raw}': an absolute URL with scheme and host is required"
            )));
        }

        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self { base })
    }

    /// Returns the normalised base URL.
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Resolves the full URL of `operation`.
    ///
    /// # Errors
    ///
    /// Returns [`FleetLockError::RequestBuild`] if the join fails.
    pub fn url_for(&self, operation: Operation) -> Result<Url, FleetLockError> {
        self.base
            .join(operation.path())
            .map_err(|source| FleetLockError::RequestBuild {
                path: operation.path(),
                source,
            })
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.base)
    }
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

/// Request body sent with both operations:
/// `{"client_params": {"id": ..., "group": ...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    /// Parameters identifying the client.
    pub client_params: ClientParams,
}

/// Identity of the client as carried inside [`Payload`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientParams {
    /// Node identifier.
    pub id: NodeId,
    /// Reboot group.
    pub group: RebootGroup,
}

impl From<&Identity> for Payload {
    fn from(identity: &Identity) -> Self {
        Self {
            client_params: ClientParams {
                id: identity.id.clone(),
                group: identity.group.clone(),
            },
        }
    }
}

/// Error object returned by the server with 3xx/4xx/5xx responses.
///
/// Missing fields decode as empty strings; anything that is not a JSON object
/// fails to decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error category (e.g. `"already_locked"`).
    #[serde(default)]
    pub kind: String,
    /// Human-readable detail.
    #[serde(default)]
    pub value: String,
}

impl std::fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.value)
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
