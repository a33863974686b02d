//! Conductor daemon
//!
//! Loads configuration, runs the orchestrator startup sequence, and
//! shuts down cleanly on Ctrl-C. Uses the in-memory effect
//! collaborators; production deployments supply their own transports
//! behind the effect traits.

use std::path::PathBuf;

use anyhow::Context;
use conductor_engine::MemoryEffects;
use conductor_runtime::{telemetry, Orchestrator, RuntimeConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    telemetry::init_tracing(&config.logging);

    let effects = MemoryEffects::new();
    let mut orchestrator = Orchestrator::new(config, effects.bundle())?;
    orchestrator.start().await?;
    info!(status = ?orchestrator.health().status, "Conductor started");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    orchestrator.shutdown().await?;
    info!(status = ?orchestrator.health().status, "Conductor stopped");
    Ok(())
}

/// Read the config document named on the command line, or fall back to
/// defaults when none is given.
fn load_config() -> anyhow::Result<RuntimeConfig> {
    match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            serde_yaml::from_str(&text)
                .with_context(|| format!("invalid config {}", path.display()))
        }
        None => Ok(RuntimeConfig::default()),
    }
}
