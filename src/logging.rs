//! Log output setup for the binaries.

use tracing_subscriber::EnvFilter;

/// Install a formatted stderr subscriber
///
/// `RUST_LOG` wins when set; otherwise `default_level` (e.g. `info`, `windpack=debug`)
/// is used.
///
/// # Errors
/// Returns an error if a global subscriber is already installed or the filter is invalid.
pub fn init(default_level: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_level)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
}
