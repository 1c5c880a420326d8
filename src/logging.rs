//! Logger setup.
//!
//! Default level is `info`. `EBS_OPTIMIZER_DEBUG=true` raises it to `debug`,
//! and `RUST_LOG` overrides both.

use tracing_subscriber::EnvFilter;

/// Environment variable that turns on debug logging
pub const DEBUG_ENV: &str = "EBS_OPTIMIZER_DEBUG";

/// Default filter directive for a given `EBS_OPTIMIZER_DEBUG` value
pub fn default_level(debug_env: Option<&str>) -> &'static str {
    match debug_env {
        Some(value) if value.trim().eq_ignore_ascii_case("true") => "debug",
        _ => "info",
    }
}

/// Initialize the logger with appropriate settings.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    let debug_env = std::env::var(DEBUG_ENV).ok();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(debug_env.as_deref())));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_thread_names(true)
        .with_writer(std::io::stderr)
        .try_init();
}
