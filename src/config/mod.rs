//! Configuration management.
//!
//! The retention can come from a TOML file, from environment variables, or
//! both, in which case the environment wins.
//!
//! # Environment Variables
//!
//! | Variable | Type | Default | Description |
//! |----------|------|---------|-------------|
//! | `SHORT_TERM_MEMORY_RETENTION_SECS` | i64 | `0` | Retention in seconds |
//! | `SHORT_TERM_MEMORY_RETENTION_MS` | i64 | unset | Retention in milliseconds, overrides seconds |
//!
//! # File Format
//!
//! ```toml
//! retention_secs = 300
//! # or, taking precedence:
//! retention_ms = 1500
//! ```
//!
//! Negative values are accepted and clamp to zero, so nothing is remembered.

use crate::memory::ShortTermMemoryBuilder;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Environment variable holding the retention in seconds.
pub const RETENTION_SECS_ENV: &str = "SHORT_TERM_MEMORY_RETENTION_SECS";

/// Environment variable holding the retention in milliseconds.
pub const RETENTION_MS_ENV: &str = "SHORT_TERM_MEMORY_RETENTION_MS";

/// Configuration for a short term memory.
///
/// # Example
///
/// ```rust
/// use short_term_memory::MemoryConfig;
/// use std::time::Duration;
///
/// let config = MemoryConfig::from_toml_str("retention_secs = 120")?;
/// assert_eq!(config.retention, Duration::from_secs(120));
///
/// let memory = config.builder().build::<String>()?;
/// assert_eq!(memory.retention(), Duration::from_secs(120));
/// # Ok::<(), short_term_memory::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoryConfig {
    /// How long values are remembered.
    pub retention: Duration,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Retention in seconds.
    pub retention_secs: Option<i64>,
    /// Retention in milliseconds.
    pub retention_ms: Option<i64>,
}

impl MemoryConfig {
    /// Creates a configuration with the given retention.
    #[must_use]
    pub const fn new(retention: Duration) -> Self {
        Self { retention }
    }

    /// Creates a configuration from environment variables.
    ///
    /// Falls back to defaults for unset or unparsable variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates a configuration from a variable lookup function.
    ///
    /// Behaves like [`from_env`](Self::from_env) but reads variables through
    /// `lookup`, which keeps tests away from the process environment.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::default().with_overrides_from(lookup)
    }

    /// Applies environment-style overrides on top of this configuration.
    #[must_use]
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let secs = parse_signed(&lookup, RETENTION_SECS_ENV);
        let ms = parse_signed(&lookup, RETENTION_MS_ENV);

        if let Some(retention) = retention_from_parts(secs, ms) {
            self.retention = retention;
        }
        self
    }

    /// Parses a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)
            .map_err(|e| Error::InvalidInput(format!("invalid memory config: {e}")))?;
        Ok(Self::from_file(&file))
    }

    /// Loads a configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config".to_string(),
            cause: format!("{}: {}", path.display(), e),
        })?;

        let config = Self::from_toml_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            retention_ms = %config.retention.as_millis(),
            "Loaded memory config"
        );
        Ok(config)
    }

    /// Builds the configuration from a parsed file.
    #[must_use]
    pub fn from_file(file: &ConfigFile) -> Self {
        retention_from_parts(file.retention_secs, file.retention_ms)
            .map_or_else(Self::default, Self::new)
    }

    /// Returns a builder preconfigured with this configuration.
    #[must_use]
    pub const fn builder(&self) -> ShortTermMemoryBuilder {
        ShortTermMemoryBuilder::new().with_retention(self.retention)
    }
}

/// Reads a signed integer variable, warning about values that don't parse.
fn parse_signed<F>(lookup: &F, key: &str) -> Option<i64>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(variable = key, value = %raw, error = %e, "Ignoring invalid retention");
            None
        },
    }
}

/// Combines seconds and milliseconds, milliseconds winning.
fn retention_from_parts(secs: Option<i64>, ms: Option<i64>) -> Option<Duration> {
    match (secs, ms) {
        (_, Some(ms)) => Some(Duration::from_millis(clamp_negative(ms))),
        (Some(secs), None) => Some(Duration::from_secs(clamp_negative(secs))),
        (None, None) => None,
    }
}

fn clamp_negative(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_else(|_| {
        tracing::debug!(value, "Negative retention clamped to zero");
        0
    })
}
