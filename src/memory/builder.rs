//! Builder for short term memory objects.

use std::time::Duration;

use super::short_term::ShortTermMemory;
use crate::Result;
use crate::clock::{Clock, SystemClock};

/// Configures and creates [`ShortTermMemory`] instances.
///
/// The retention defaults to zero, which means values are not remembered
/// at all.
///
/// # Example
///
/// ```rust
/// use short_term_memory::{ManualClock, ShortTermMemoryBuilder};
/// use std::time::Duration;
///
/// let clock = ManualClock::new();
/// let memory = ShortTermMemoryBuilder::new()
///     .with_retention(Duration::from_secs(60))
///     .with_clock(clock.clone())
///     .build()?;
///
/// memory.add(7_u32);
/// clock.advance(Duration::from_secs(60));
/// assert!(!memory.has(&7));
/// # Ok::<(), short_term_memory::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct ShortTermMemoryBuilder<C = SystemClock> {
    /// How long values will be remembered.
    retention: Duration,
    /// Time source handed to the built memory.
    clock: C,
}

impl ShortTermMemoryBuilder {
    /// Creates a builder with zero retention and the system clock.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            retention: Duration::ZERO,
            clock: SystemClock,
        }
    }
}

impl Default for ShortTermMemoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> ShortTermMemoryBuilder<C> {
    /// Sets how long values will be remembered.
    #[must_use]
    pub const fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    /// Replaces the time source.
    #[must_use]
    pub fn with_clock<D: Clock>(self, clock: D) -> ShortTermMemoryBuilder<D> {
        ShortTermMemoryBuilder {
            retention: self.retention,
            clock,
        }
    }

    /// Returns the configured retention.
    #[must_use]
    pub const fn retention(&self) -> Duration {
        self.retention
    }

    /// Creates a memory with the configuration stored in the builder.
    ///
    /// This currently never fails.
    ///
    /// ```rust
    /// use short_term_memory::ShortTermMemoryBuilder;
    ///
    /// let memory = ShortTermMemoryBuilder::new().build::<String>()?;
    /// assert!(memory.is_empty());
    /// # Ok::<(), short_term_memory::Error>(())
    /// ```
    #[allow(clippy::unnecessary_wraps)] // Keeps room for validation without an API break
    pub fn build<T: PartialEq>(self) -> Result<ShortTermMemory<T, C>> {
        tracing::debug!(
            retention_ms = %self.retention.as_millis(),
            "Building short term memory"
        );
        Ok(ShortTermMemory::new(self.retention, self.clock))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    #[test]
    fn test_default_retention_is_zero() {
        let builder = ShortTermMemoryBuilder::default();
        assert_eq!(builder.retention(), Duration::ZERO);

        let memory = builder.build().unwrap();
        memory.add("value");
        assert!(!memory.has(&"value"));
    }

    #[test]
    fn test_with_retention() {
        let memory = ShortTermMemoryBuilder::new()
            .with_retention(Duration::from_secs(30))
            .build::<u32>()
            .unwrap();

        assert_eq!(memory.retention(), Duration::from_secs(30));
    }

    #[test]
    fn test_with_clock_keeps_retention() {
        let clock = ManualClock::new();
        let memory = ShortTermMemoryBuilder::new()
            .with_retention(Duration::from_secs(30))
            .with_clock(clock.clone())
            .build()
            .unwrap();

        memory.add("value");
        clock.advance(Duration::from_secs(29));
        assert!(memory.has(&"value"));
        clock.advance(Duration::from_secs(1));
        assert!(!memory.has(&"value"));
    }

    #[test]
    fn test_retention_set_after_clock() {
        let builder = ShortTermMemoryBuilder::new()
            .with_clock(ManualClock::new())
            .with_retention(Duration::from_millis(500));

        assert_eq!(builder.retention(), Duration::from_millis(500));
    }

    #[test]
    fn test_builds_are_independent() {
        let builder = ShortTermMemoryBuilder::new().with_retention(Duration::from_secs(60));

        let first = builder.clone().build().unwrap();
        let second = builder.build().unwrap();

        first.add("value");
        assert!(first.has(&"value"));
        assert!(!second.has(&"value"));
    }
}
