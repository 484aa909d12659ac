//! A single remembered value.

use std::time::{Duration, Instant};

/// A value stored in the memory, together with the instant it was last
/// added.
#[derive(Debug, Clone)]
pub(crate) struct Cell<T> {
    /// The remembered value.
    value: T,
    /// When the cell was created or last refreshed.
    stamp: Instant,
}

impl<T> Cell<T> {
    /// Creates a cell stamped with `now`.
    pub(crate) const fn new(value: T, now: Instant) -> Self {
        Self { value, stamp: now }
    }

    /// Returns the stored value.
    pub(crate) const fn value(&self) -> &T {
        &self.value
    }

    /// Restamps the cell, extending its lifetime.
    pub(crate) const fn refresh(&mut self, now: Instant) {
        self.stamp = now;
    }

    /// Age of the cell at `now`; zero if `now` precedes the stamp.
    pub(crate) fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.stamp)
    }

    /// A cell is alive while its age is strictly below the retention.
    pub(crate) fn is_alive(&self, now: Instant, retention: Duration) -> bool {
        self.age(now) < retention
    }
}
