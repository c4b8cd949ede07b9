//! Tracing setup: JSON subscriber, span macros, structured events.

pub mod events;
pub mod spans;

use tracing_subscriber::EnvFilter;

use tessera_core::config::ObservabilityConfig;
use tessera_core::config::defaults::DEFAULT_LOG_LEVEL;

/// Environment variable holding the filter directive.
pub const LOG_ENV: &str = "TESSERA_LOG";

/// Install the JSON subscriber, filtered by `TESSERA_LOG` (default `info`).
///
/// Returns `false` when a global subscriber is already installed.
pub fn init_tracing() -> bool {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));
    install(filter)
}

/// Install the JSON subscriber with an explicit filter (tests, embedding hosts).
pub fn init_tracing_with_filter(filter: &str) -> bool {
    install(EnvFilter::new(filter))
}

/// `TESSERA_LOG` wins over the configured level. Does nothing unless
/// tracing is enabled in the config.
pub fn init_from_config(config: &ObservabilityConfig) -> bool {
    if !config.tracing_enabled {
        return false;
    }
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    install(filter)
}

fn install(filter: EnvFilter) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .json()
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_config_installs_nothing() {
        let config = ObservabilityConfig {
            tracing_enabled: false,
            ..Default::default()
        };
        assert!(!init_from_config(&config));
    }

    #[test]
    fn second_install_is_refused() {
        init_tracing_with_filter("warn");
        assert!(!init_tracing_with_filter("debug"));
    }
}
