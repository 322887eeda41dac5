//! Logging setup using `tracing` and `tracing-subscriber`.
//!
//! Logs go to stderr so stdout stays clean for table and JSON output.
//!
//! # Log Levels
//!
//! - `warn`: template warnings, skipped input (default)
//! - `info`: extraction and ingest summaries (`-v`)
//! - `debug`: per-stage details (`-vv`)
//! - `trace`: per-row outcomes (`-vvv`)
//!
//! `QUOTEMAP_LOG` (or `RUST_LOG`) overrides the level with a full filter directive.

use std::io;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable checked before `RUST_LOG`.
pub const LOG_ENV: &str = "QUOTEMAP_LOG";

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    pub with_ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            with_ansi: true,
        }
    }
}

impl LogConfig {
    /// Map `-v` occurrences to a level: none is warn, then info, debug, trace.
    #[must_use]
    pub fn from_verbosity(verbosity: u8) -> Self {
        let level = match verbosity {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };
        Self {
            level,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_ansi(mut self, enable: bool) -> Self {
        self.with_ansi = enable;
        self
    }
}

/// Install the global subscriber. Call once at startup.
pub fn init_logging(config: &LogConfig) {
    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(config.with_ansi)
        .with_target(false)
        .without_time();

    // try_init: a second call (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(build_env_filter(config.level))
        .with(layer)
        .try_init();
}

fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| {
            // Dependencies stay at warn.
            let level = level.as_str().to_lowercase();
            EnvFilter::new(format!(
                "warn,quotemap={level},quotemap_core={level},quotemap_cli={level}"
            ))
        })
}
