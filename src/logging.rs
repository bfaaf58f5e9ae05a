//! Diagnostics via `tracing`, written to stderr.
//!
//! - `warn`: default; recoverable oddities such as an invalid theme color
//! - `info`: exports written, documents saved
//! - `debug`: loaded documents, rows that did not fit
//! - `trace`: everything else
//!
//! `SEMWRAP_LOG` accepts any `EnvFilter` directive and wins over `-v`.

use std::io;

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable that overrides the verbosity flag.
pub const LOG_ENV: &str = "SEMWRAP_LOG";

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
    /// Map a repeated `-v` count onto a level.
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

/// Install the global subscriber. Calling it twice is a no-op.
pub fn init_logging(config: &LogConfig) {
    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(config.with_ansi)
        .with_target(false)
        .without_time();
    let _ = tracing_subscriber::registry()
        .with(build_env_filter(config.level))
        .with(layer)
        .try_init();
}

fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        // Dependencies stay quiet unless asked for explicitly.
        let level = level.as_str().to_lowercase();
        EnvFilter::new(format!("warn,semwrap={level}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn verbosity_maps_to_levels() {
        let levels: Vec<Level> = (0..5).map(|v| LogConfig::from_verbosity(v).level).collect();
        assert_eq!(
            levels,
            vec![Level::WARN, Level::INFO, Level::DEBUG, Level::TRACE, Level::TRACE]
        );
    }

    #[test]
    fn ansi_can_be_disabled() {
        assert!(!LogConfig::from_verbosity(1).with_ansi(false).with_ansi);
    }
}
