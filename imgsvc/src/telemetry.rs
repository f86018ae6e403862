//! Tracing initialization.
//!
//! Installs a `tracing-subscriber` registry with console output. The filter defaults to `info`
//! and can be overridden with `RUST_LOG`, for example:
//!
//! ```bash
//! RUST_LOG=imgsvc=debug,tower_http=debug
//! ```

use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize tracing with an env filter and a fmt layer
pub fn init_telemetry() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    info!("Telemetry initialized");
    Ok(())
}
