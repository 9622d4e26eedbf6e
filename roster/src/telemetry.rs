//! Tracing initialization: an `EnvFilter` (from `RUST_LOG`, default `info`) in front of a fmt
//! layer writing to stdout.
//!
//! ```bash
//! RUST_LOG=roster=debug,sqlx=warn,tower_http=debug cargo run
//! ```

use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install the global subscriber. Fails if one is already installed.
pub fn init_telemetry() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    info!("Telemetry initialized");
    Ok(())
}
