//! Tracing bootstrap for hosts that do not install their own subscriber

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::GuardConfig;

/// Install a global fmt subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Returns `false`
/// when a subscriber was already installed, which is not an error: hosts
/// and tests may call this any number of times.
pub fn init_tracing(config: &GuardConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true);

    let installed = if config.log_json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    };

    if installed {
        tracing::debug!(level = %config.log_level, json = config.log_json, "Tracing initialized");
    }
    installed
}
