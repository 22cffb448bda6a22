//! Configuration resolution for the `fleetlock` binary.
//!
//! Values come from three layers, highest precedence first:
//!
//! 1. command-line flags (or their `FLEETLOCK_*` environment variables),
//! 2. the TOML file named by `--config`,
//! 3. built-in defaults.
//!
//! The node id falls back to `/etc/machine-id` when no layer sets it. The
//! server URL has no default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// Group used when none is configured.
pub const DEFAULT_GROUP: &str = "default";

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the node id is read from when none is configured.
pub const MACHINE_ID_PATH: &str = "/etc/machine-id";

/// Contents of the optional TOML config file.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// FleetLock server base URL.
    pub url: Option<String>,
    /// Reboot group.
    pub group: Option<String>,
    /// Node identifier.
    pub id: Option<String>,
    /// Request timeout in seconds; `0` disables it.
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Reads and parses `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config file {}", path.display()))
    }
}

/// Values supplied on the command line or through the environment.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Overrides {
    pub url: Option<String>,
    pub group: Option<String>,
    pub id: Option<String>,
    pub timeout_secs: Option<u64>,
    pub config: Option<PathBuf>,
}

/// Fully resolved settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub url: String,
    pub group: String,
    pub id: String,
    /// `None` when the configured timeout is zero.
    pub timeout: Option<Duration>,
}

impl Settings {
    /// Resolves settings, reading the config file and machine-id as needed.
    pub fn resolve(overrides: Overrides) -> Result<Self> {
        let file = match &overrides.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::merge(overrides, file, || read_machine_id(Path::new(MACHINE_ID_PATH)))
    }

    /// Merges the layers. `machine_id` is only called when no id is set.
    pub fn merge(
        overrides: Overrides,
        file: FileConfig,
        machine_id: impl FnOnce() -> Result<String>,
    ) -> Result<Self> {
        let Some(url) = overrides.url.or(file.url) else {
            bail!("no FleetLock server URL configured (use --url, FLEETLOCK_URL or `url` in the config file)");
        };

        let group = overrides
            .group
            .or(file.group)
            .unwrap_or_else(|| DEFAULT_GROUP.to_string());

        let id = match overrides.id.or(file.id) {
            Some(id) => id,
            None => machine_id().context("no node id configured and machine-id unavailable")?,
        };

        let timeout = overrides
            .timeout_secs
            .or(file.timeout_secs)
            .map_or(Some(DEFAULT_TIMEOUT), |secs| {
                (secs > 0).then(|| Duration::from_secs(secs))
            });

        Ok(Self {
            url,
            group,
            id,
            timeout,
        })
    }
}

/// Reads a machine-id file, trimming the trailing newline.
pub fn read_machine_id(path: &Path) -> Result<String> {
    let raw =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let id = raw.trim();
    if id.is_empty() {
        bail!("{} is empty", path.display());
    }
    Ok(id.to_string())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
