//! Logging utilities for DBSet
//!
//! The engine emits `tracing` events; the subscriber installed by the
//! application is the sink. These helpers install a `fmt` subscriber.
//!
//! Targets:
//! - `dbset::sql` — assembled SQL before execution
//! - `dbset::params` — bound parameter values
//! - `dbset::dataset` — cursor/assembly diagnostics

#[cfg(feature = "logging")]
use tracing_subscriber::{EnvFilter, fmt};

/// Target for assembled SQL text.
pub const SQL_TARGET: &str = "dbset::sql";

/// Target for bound parameter values.
pub const PARAMS_TARGET: &str = "dbset::params";

/// Target for cursor and assembly diagnostics.
pub const DATASET_TARGET: &str = "dbset::dataset";

/// Initialize logging with default settings
///
/// # Environment Variables
/// - `RUST_LOG` - Log level filter (default: "info")
///
/// # Example
/// ```rust
/// dbset_core::logging::init();
/// ```
#[cfg(feature = "logging")]
pub fn init() {
    init_with_level("info")
}

/// Initialize logging with a specific level
///
/// # Arguments
/// * `level` - Log level (trace, debug, info, warn, error)
#[cfg(feature = "logging")]
pub fn init_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .try_init();
}

/// Initialize logging for tests
#[cfg(feature = "logging")]
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("trace"))
        .with_test_writer()
        .try_init();
}

#[cfg(not(feature = "logging"))]
pub fn init() {}

#[cfg(not(feature = "logging"))]
pub fn init_with_level(_level: &str) {}

#[cfg(not(feature = "logging"))]
pub fn init_test() {}
