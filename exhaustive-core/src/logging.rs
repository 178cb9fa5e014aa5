//! Structured logging using **tracing**.
//!
//! Events go to stderr as JSON so stdout stays reserved for diagnostics.
//! Rayon workers log through the same global subscriber.

/// Initializes the global tracing subscriber.
///
/// Call once at startup. Safe to call again: later calls are ignored.
///
/// # Environment Variables
/// - `RUST_LOG`: Controls log filtering (e.g., `RUST_LOG=exhaustive_core=debug`)
pub fn init_structured_logging() {
    let _ = tracing_subscriber::fmt()
        .json()
        .with_ansi(false)
        .with_level(true)
        .with_target(true)
        .with_current_span(true)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}
