//! Structured logging setup via `tracing-subscriber`.
//!
//! `RUST_LOG` always wins if set, otherwise falls back to the configured
//! level. Text or JSON output is picked once at startup.

use crate::config::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    let registry = tracing_subscriber::registry().with(filter);

    if config.log_json {
        registry.with(fmt::layer().json().with_target(false)).init();
    } else {
        registry.with(fmt::layer().with_target(false)).init();
    }
}
