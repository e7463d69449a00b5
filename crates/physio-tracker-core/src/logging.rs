//! Logging setup.
//!
//! The library only emits `tracing` events; hosts decide where they go.
//! [`init`] installs a plain fmt subscriber for hosts without their own.

use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Install a global fmt subscriber filtered by `filter`.
///
/// Returns false if the filter is invalid or a subscriber is already set.
pub fn init(filter: &str) -> bool {
    match EnvFilter::try_new(filter) {
        Ok(env_filter) => install(env_filter),
        Err(_) => false,
    }
}

/// Install the subscriber using the configured `log_filter`.
pub fn init_from_config(config: &Config) -> bool {
    match config_filter(config) {
        Ok(env_filter) => install(env_filter),
        Err(e) => {
            tracing::warn!(filter = %config.log_filter, error = %e, "ignoring invalid log filter");
            false
        }
    }
}

fn config_filter(config: &Config) -> Result<EnvFilter, ParseError> {
    EnvFilter::try_new(&config.log_filter)
}

fn install(env_filter: EnvFilter) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_rejected() {
        assert!(!init("physio_tracker_core=loud"));
    }

    #[test]
    fn test_second_init_is_harmless() {
        init("physio_tracker_core=debug");
        assert!(!init("physio_tracker_core=debug"));
    }

    #[test]
    fn test_config_filter_uses_log_filter() {
        let config = Config {
            log_filter: "physio_tracker_core=trace".to_string(),
            ..Config::default()
        };
        let filter = config_filter(&config).unwrap();
        assert_eq!(filter.to_string(), "physio_tracker_core=trace");

        let default = config_filter(&Config::default()).unwrap();
        assert_eq!(default.to_string(), "physio_tracker_core=info");
    }

    #[test]
    fn test_invalid_config_filter_not_installed() {
        let config = Config {
            log_filter: "physio_tracker_core=loud".to_string(),
            ..Config::default()
        };
        assert!(config_filter(&config).is_err());
        assert!(!init_from_config(&config));
    }
}
