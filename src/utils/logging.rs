//! Tracing subscriber setup.
//!
//! `RUST_LOG` always wins over the configured level so operators can turn on
//! debug output for a single module without touching `docqa.toml`.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Build the filter from `RUST_LOG`, falling back to the configured level.
pub fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "docqa={level},docqa_server={level},tower_http={level}",
            level = default_level
        ))
    })
}

/// Install the global subscriber. `format` is `pretty` or `json`.
pub fn init_tracing(default_level: &str, format: &str) {
    let filter = env_filter(default_level);

    let registry = tracing_subscriber::registry().with(filter);
    let result = if format == "json" {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    // A subscriber may already be installed (tests, embedding applications)
    if let Err(e) = result {
        eprintln!("tracing subscriber already initialised: {}", e);
    }
}
