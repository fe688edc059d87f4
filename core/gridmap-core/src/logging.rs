//! Logging utilities for gridmap
//!
//! Every event the dialects emit uses the `gridmap` target: `info` when a
//! dialect is opened or created, `debug` for bulk scans, inserts and rejected
//! lock requests, `trace` for single tuple writes. Filter on it with
//! `RUST_LOG=gridmap=debug`.
//!
//! The helpers below need the `logging` feature; without it they do nothing
//! and the application installs its own subscriber.

#[cfg(feature = "logging")]
use tracing_subscriber::{EnvFilter, fmt};

/// Install a subscriber showing `gridmap` events at `info` and above.
///
/// `RUST_LOG` overrides the filter when set.
///
/// # Example
/// ```rust
/// gridmap_core::logging::init();
/// ```
#[cfg(feature = "logging")]
pub fn init() {
    init_with_level("info")
}

/// Install a subscriber showing `gridmap` events at `level` and above.
///
/// `level` is one of trace, debug, info, warn, error. Events from other
/// targets stay at `warn`. A subscriber that is already installed is kept.
#[cfg(feature = "logging")]
pub fn init_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,gridmap={level}")));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .try_init();
}

/// Install a subscriber for tests: `gridmap=trace`, written through the
/// test harness so output only shows for failing tests.
#[cfg(feature = "logging")]
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("gridmap=trace"))
        .with_test_writer()
        .try_init();
}

// No-ops when the logging feature is disabled
#[cfg(not(feature = "logging"))]
pub fn init() {}

#[cfg(not(feature = "logging"))]
pub fn init_with_level(_level: &str) {}

#[cfg(not(feature = "logging"))]
pub fn init_test() {}
