//! Process-wide logging setup.
//!
//! Configured once at startup from `GITSYNC_LOG_LEVEL` and
//! `GITSYNC_LOG_FORMAT`. Output goes to stderr as JSON by default;
//! `pretty` switches to the human-readable formatter.

use gitsync_common::envvar::EnvVars;
use gitsync_common::APP_NAME;
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber. Invalid settings fall back to the
/// defaults and are reported once logging is up.
pub fn init(env: &EnvVars) {
    let level_setting = env.get_for_app(APP_NAME, "LOG_LEVEL");
    let level = match level_setting.to_ascii_lowercase().as_str() {
        "" => "info",
        "debug" => "debug",
        "info" => "info",
        "warn" => "warn",
        "error" => "error",
        _ => "info",
    };
    let filter = EnvFilter::new(level);

    let format_setting = env.get_for_app(APP_NAME, "LOG_FORMAT");
    match format_setting.to_ascii_lowercase().as_str() {
        "pretty" => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr))
                .with(filter)
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .with(filter)
                .init();
        }
    }

    if !level_setting.is_empty() && !matches!(level_setting.to_ascii_lowercase().as_str(), "debug" | "info" | "warn" | "error") {
        warn!(level = %level_setting, "unknown log level, using 'info'");
    }
    if !format_setting.is_empty() && !matches!(format_setting.to_ascii_lowercase().as_str(), "json" | "pretty") {
        warn!(format = %format_setting, "unknown log format, using 'json'");
    }
}
