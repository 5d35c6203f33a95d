//! Logging setup.

use tracing_subscriber::EnvFilter;

use crate::config::EngineConfig;

/// Install a global fmt subscriber.
///
/// `RUST_LOG` takes precedence over `config.log_filter`. Returns `false` if a
/// subscriber was already installed, so embedding applications and tests can
/// call this more than once.
pub fn init_tracing(config: &EngineConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        let config = EngineConfig::default();
        init_tracing(&config);
        assert!(!init_tracing(&config));
    }
}
