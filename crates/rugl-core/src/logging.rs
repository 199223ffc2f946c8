//! Logging setup on top of `tracing-subscriber`.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn,naga=warn";

/// Install the global `fmt` subscriber.
///
/// Honours `RUST_LOG` and falls back to [`DEFAULT_FILTER`]. Panics if a global
/// subscriber was already installed; use [`try_init`] when that can happen
/// (tests, embedding).
pub fn init() {
    init_with_filter(None);
}

/// Install the global subscriber with an explicit filter directive.
pub fn init_with_filter(filter: Option<&str>) {
    tracing_subscriber::fmt().with_env_filter(env_filter(filter)).init();
}

/// Like [`init`], but returns an error instead of panicking.
pub fn try_init(
    filter: Option<&str>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(filter))
        .try_init()
}

fn env_filter(filter: Option<&str>) -> EnvFilter {
    match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    }
}
