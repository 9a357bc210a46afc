//! Headless host binary for stdin/stdout JSON communication.
//!
//! Reads engine input events as newline-delimited JSON from stdin and
//! writes engine output events to stdout. All tracing/diagnostic output
//! goes to stderr so that stdout remains a clean JSON protocol channel.

use glance::config::EngineConfig;
use glance::host::run_stdio_bridge;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise tracing to stderr only (stdout is reserved for the JSON
    // protocol).
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config_path = glance::paths::config_path();
    let config = if config_path.exists() {
        EngineConfig::from_file(&config_path)
            .map_err(|e| anyhow::anyhow!("failed to load {}: {e}", config_path.display()))?
    } else {
        EngineConfig::default()
    };

    tracing::info!("glance-host starting");

    run_stdio_bridge(config).await.map_err(|e| {
        tracing::error!(error = %e, "glance-host exited with error");
        anyhow::anyhow!("glance-host failed: {e}")
    })?;

    tracing::info!("glance-host shut down cleanly");
    Ok(())
}
