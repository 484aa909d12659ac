//! Structured logging configuration.

use std::path::PathBuf;

/// Environment variable selecting the log format (`json` or `pretty`).
pub const LOG_FORMAT_ENV: &str = "SHORT_TERM_MEMORY_LOG_FORMAT";

/// Environment variable naming a file to append logs to.
pub const LOG_FILE_ENV: &str = "SHORT_TERM_MEMORY_LOG_FILE";

/// Standard filter directive variable.
pub const LOG_FILTER_ENV: &str = "RUST_LOG";

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per line.
    Json,
    /// Human readable, multi-line output.
    #[default]
    Pretty,
}

impl LogFormat {
    /// Parses a format name, case-insensitively.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "pretty" | "text" => Some(Self::Pretty),
            _ => None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// `EnvFilter` directive, e.g. `short_term_memory=debug`.
    pub filter: String,
    /// Optional file to append to instead of stderr.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            filter: "info".to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Builds logging configuration from environment variables.
    #[must_use]
    pub fn from_env(verbose: bool) -> Self {
        Self::from_lookup(verbose, |key| std::env::var(key).ok())
    }

    /// Builds logging configuration from a variable lookup function.
    ///
    /// `verbose` raises the default filter to `debug`; an explicit
    /// `RUST_LOG` still wins.
    #[must_use]
    pub fn from_lookup<F>(verbose: bool, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let format = lookup(LOG_FORMAT_ENV)
            .and_then(|v| LogFormat::parse(&v))
            .unwrap_or_default();

        let filter = lookup(LOG_FILTER_ENV)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| (if verbose { "debug" } else { "info" }).to_string());

        let file = lookup(LOG_FILE_ENV)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Self {
            format,
            filter,
            file,
        }
    }
}
