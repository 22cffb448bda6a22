//! FleetLock CLI entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Parse configuration**: flags and `FLEETLOCK_*` environment variables,
//!    an optional TOML file, and `/etc/machine-id` as the fallback node id.
//! 2. **Wire observability**: `tracing-subscriber` to stderr plus an optional
//!    OpenTelemetry OTLP exporter.
//! 3. **Construct infrastructure**: a [`ReqwestTransport`] injected into a
//!    [`FleetLockClient`].
//! 4. **Run the command**: `recursive-lock` before a reboot, `unlock-if-held`
//!    once the node is back in steady state. Any failure exits with status 1.

mod config;
mod observability;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use http_transport::{HttpTransportConfig, ReqwestTransport};
use protocol::{FleetLockClient, InvocationId};
use tracing::{info_span, Instrument};

use crate::config::{Overrides, Settings};
use crate::observability::LogFormat;

/// Coordinate node reboots through a FleetLock server.
#[derive(Debug, Parser)]
#[command(name = "fleetlock", version, about)]
struct Cli {
    /// FleetLock server base URL (e.g. https://fleetlock.example:8443).
    #[arg(long, env = "FLEETLOCK_URL", global = true)]
    url: Option<String>,

    /// Reboot group of this node [default: default].
    #[arg(long, env = "FLEETLOCK_GROUP", global = true)]
    group: Option<String>,

    /// Node identifier [default: contents of /etc/machine-id].
    #[arg(long, env = "FLEETLOCK_ID", global = true)]
    id: Option<String>,

    /// Request timeout in seconds, 0 to disable [default: 30].
    #[arg(long, env = "FLEETLOCK_TIMEOUT", global = true)]
    timeout: Option<u64>,

    /// TOML file with `url`, `group`, `id` and `timeout_secs` keys.
    #[arg(long, env = "FLEETLOCK_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Log line format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum Command {
    /// Acquire a reboot slot (pre-reboot). Exits 0 when rebooting is allowed.
    #[command(alias = "lock")]
    RecursiveLock,
    /// Release the reboot slot if held (steady-state).
    #[command(alias = "unlock")]
    UnlockIfHeld,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            url: self.url.clone(),
            group: self.group.clone(),
            id: self.id.clone(),
            timeout_secs: self.timeout,
            config: self.config.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _telemetry = match observability::init(&cli.log_level, cli.log_format) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let invocation = InvocationId::new_random();
    let span = info_span!("fleetlock", invocation_id = %invocation, command = ?cli.command);

    match run(&cli).instrument(span).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let settings = Settings::resolve(cli.overrides())?;

    let transport = ReqwestTransport::new(&HttpTransportConfig {
        timeout: settings.timeout,
        ..HttpTransportConfig::default()
    })
    .context("building the HTTP transport")?;

    let client = FleetLockClient::new(&settings.url, settings.group, settings.id, transport)
        .context("building the client")?;

    match cli.command {
        Command::RecursiveLock => client.recursive_lock().await.context("locking"),
        Command::UnlockIfHeld => client.unlock_if_held().await.context("unlocking"),
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
