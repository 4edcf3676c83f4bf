//! Diagnostic logging on stderr
//!
//! Level precedence: `RUST_LOG`, then `--verbose` (debug), then the config
//! file's `log_level` (default warn). Stdout carries only the report.

use funcspan_core::config::LogLevel;
use std::sync::Once;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: Once = Once::new();

/// Install the global subscriber; only the first call takes effect
pub fn init(verbose: bool, level: LogLevel) {
    INIT.call_once(|| {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new(level.as_str())
        };

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_filter(filter);

        tracing_subscriber::registry().with(fmt_layer).init();
    });
}
