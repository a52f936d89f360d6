//! Log filter selection from settings.

use meta_types::Settings;
use tracing_subscriber::EnvFilter;

/// The filter a process should install: `RUST_LOG` when set, otherwise the
/// configured `log_level`.
pub fn log_filter(settings: &Settings) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| settings_filter(settings))
}

fn settings_filter(settings: &Settings) -> EnvFilter {
    EnvFilter::new(&settings.log_level)
}
