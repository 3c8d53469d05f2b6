//! Log subscriber setup

use tracing_subscriber::EnvFilter;

use crate::TelemetryConfig;

/// Install the global `tracing` subscriber
///
/// `RUST_LOG` wins over the configured filter. Returns `false` when a
/// subscriber was already installed, which leaves that one in place.
pub fn init(config: &TelemetryConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let installed = if config.json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    };

    if installed {
        tracing::debug!(filter = %config.filter, json = config.json, "telemetry initialized");
    }
    installed
}
