//! Configuration and process-level utilities.

/// Tracing subscriber setup.
pub mod logging;
/// TOML configuration with hot reload.
pub mod toml_config;
