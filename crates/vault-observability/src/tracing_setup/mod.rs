//! Tracing setup: structured logging with span definitions and event helpers.

pub mod events;
pub mod spans;

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use vault_core::config::ObservabilityConfig;

static INIT: Once = Once::new();

/// Environment variable that overrides the configured log level.
pub const LOG_ENV: &str = "VAULT_LOG";

/// Install the global subscriber.
///
/// `VAULT_LOG` wins over `config.log_level`. Idempotent, and a no-op when
/// another subscriber is already installed (test harnesses, embedders).
pub fn init(config: &ObservabilityConfig) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .or_else(|_| EnvFilter::try_new(&config.log_level))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let result = if config.json {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .with(filter)
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true))
                .with(filter)
                .try_init()
        };
        if result.is_err() {
            tracing::debug!("tracing subscriber already installed");
        }
    });
}
