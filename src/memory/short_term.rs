//! Time-bounded deduplication memory.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use super::cell::Cell;
use crate::clock::{Clock, SystemClock};

/// Remembers values for a fixed retention period.
///
/// # How it works
///
/// 1. Every public operation takes the lock and purges expired cells first
/// 2. Values are matched with a linear scan using [`PartialEq`]
/// 3. Adding a value that is already remembered refreshes its stamp
///    instead of storing a second copy
///
/// There is no background sweeper: expired values are only dropped when
/// the memory is next touched.
///
/// # Thread Safety
///
/// All state sits behind a single [`Mutex`]. Queries take the same
/// exclusive lock as updates because purging mutates the cell list. If a
/// panic poisons the lock, the state is recovered and used as-is; cells
/// are only mutated after purge and scan have finished.
///
/// # Equality
///
/// `T`'s [`PartialEq`] must behave as an equivalence relation. Values that
/// are not equal to themselves (such as `f64::NAN`) are never found again
/// and accumulate a new cell on every add until they expire.
///
/// # Example
///
/// ```rust
/// use short_term_memory::ShortTermMemoryBuilder;
/// use std::time::Duration;
///
/// let memory = ShortTermMemoryBuilder::new()
///     .with_retention(Duration::from_secs(300))
///     .build()?;
///
/// memory.add("restart node-1");
/// assert!(memory.has(&"restart node-1"));
/// assert!(!memory.has(&"restart node-2"));
/// # Ok::<(), short_term_memory::Error>(())
/// ```
pub struct ShortTermMemory<T, C = SystemClock> {
    /// How long values are remembered.
    retention: Duration,
    /// Remembered values in insertion order.
    cells: Mutex<Vec<Cell<T>>>,
    /// Time source used to stamp and age cells.
    clock: C,
}

impl<T, C> ShortTermMemory<T, C>
where
    T: PartialEq,
    C: Clock,
{
    pub(crate) const fn new(retention: Duration, clock: C) -> Self {
        Self {
            retention,
            cells: Mutex::new(Vec::new()),
            clock,
        }
    }

    /// Records that `value` was seen now.
    ///
    /// If an equal value is already remembered its lifetime is restarted;
    /// otherwise the value is stored.
    pub fn add(&self, value: T) {
        self.upsert(value);
    }

    /// Returns `true` if an equal value was added within the retention
    /// period.
    pub fn has(&self, value: &T) -> bool {
        let mut cells = self.lock();
        let now = self.clock.now();
        self.purge_expired_cells(&mut cells, now);

        let found = find_matching_cell(&cells, value).is_some();

        metrics::counter!(
            "short_term_memory_lookups_total",
            "found" => if found { "true" } else { "false" }
        )
        .increment(1);

        found
    }

    /// Records `value` and reports whether it was already remembered.
    ///
    /// Equivalent to [`has`](Self::has) followed by [`add`](Self::add), but
    /// done under one lock so concurrent callers cannot both see `false`
    /// for the same value.
    pub fn check_and_add(&self, value: T) -> bool {
        self.upsert(value)
    }

    /// Returns the number of values currently remembered.
    pub fn len(&self) -> usize {
        let mut cells = self.lock();
        let now = self.clock.now();
        self.purge_expired_cells(&mut cells, now);
        cells.len()
    }

    /// Returns `true` if nothing is currently remembered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the configured retention.
    pub const fn retention(&self) -> Duration {
        self.retention
    }

    /// Refreshes or inserts `value`, returning whether it was already present.
    fn upsert(&self, value: T) -> bool {
        let mut cells = self.lock();
        let now = self.clock.now();
        self.purge_expired_cells(&mut cells, now);

        let found = match find_matching_cell_mut(&mut cells, &value) {
            Some(cell) => {
                cell.refresh(now);
                tracing::debug!(cells = cells.len(), "Refreshed remembered value");
                true
            },
            None => {
                cells.push(Cell::new(value, now));
                tracing::debug!(cells = cells.len(), "Remembered new value");
                false
            },
        };

        metrics::gauge!("short_term_memory_cells").set(cells.len() as f64);

        found
    }

    /// Drops every cell whose age has reached the retention, keeping the
    /// order of the survivors. The lock must already be held.
    fn purge_expired_cells(&self, cells: &mut Vec<Cell<T>>, now: Instant) {
        let before = cells.len();
        cells.retain(|cell| cell.is_alive(now, self.retention));
        let purged = before - cells.len();

        if purged > 0 {
            tracing::debug!(
                purged,
                cells = cells.len(),
                retention_ms = %self.retention.as_millis(),
                "Purged expired values"
            );
            metrics::counter!("short_term_memory_purged_total").increment(purged as u64);
            metrics::gauge!("short_term_memory_cells").set(cells.len() as f64);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Cell<T>>> {
        self.cells.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Finds the first cell holding a value equal to `value`. Assumes expired
/// cells have already been purged.
fn find_matching_cell<'a, T: PartialEq>(
    cells: &'a [Cell<T>],
    value: &T,
) -> Option<&'a Cell<T>> {
    cells.iter().find(|cell| cell.value() == value)
}

fn find_matching_cell_mut<'a, T: PartialEq>(
    cells: &'a mut [Cell<T>],
    value: &T,
) -> Option<&'a mut Cell<T>> {
    cells.iter_mut().find(|cell| cell.value() == value)
}

impl<T, C> fmt::Debug for ShortTermMemory<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells = self
            .cells
            .lock()
            .map_or_else(|poisoned| poisoned.into_inner().len(), |cells| cells.len());
        f.debug_struct("ShortTermMemory")
            .field("retention", &self.retention)
            .field("cells", &cells)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    const RETENTION: Duration = Duration::from_secs(10);

    fn memory_with_clock<T: PartialEq>(
        retention: Duration,
    ) -> (ShortTermMemory<T, ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        (ShortTermMemory::new(retention, clock.clone()), clock)
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Action {
        kind: String,
        target: String,
    }

    fn action(kind: &str, target: &str) -> Action {
        Action {
            kind: kind.to_string(),
            target: target.to_string(),
        }
    }

    #[test]
    fn test_new_memory_is_empty() {
        let (memory, _) = memory_with_clock::<u32>(RETENTION);
        assert_eq!(memory.len(), 0);
        assert!(memory.is_empty());
        assert_eq!(memory.retention(), RETENTION);
    }

    #[test]
    fn test_add_and_has() {
        let (memory, _) = memory_with_clock(RETENTION);

        memory.add(action("restart", "node-1"));

        assert!(memory.has(&action("restart", "node-1")));
        assert!(!memory.has(&action("restart", "node-2")));
        assert_eq!(memory.len(), 1);
    }

    #[test]
    fn test_add_twice_keeps_one_cell() {
        let (memory, _) = memory_with_clock(RETENTION);

        memory.add(action("restart", "node-1"));
        memory.add(action("restart", "node-1"));

        assert_eq!(memory.len(), 1);
    }

    #[test]
    fn test_add_refreshes_lifetime() {
        let (memory, clock) = memory_with_clock(RETENTION);

        memory.add("value");
        clock.advance(Duration::from_secs(8));
        memory.add("value");
        clock.advance(Duration::from_secs(8));

        // 16s after the first add, 8s after the refresh
        assert!(memory.has(&"value"));

        clock.advance(Duration::from_secs(2));
        assert!(!memory.has(&"value"));
    }

    #[test]
    fn test_expiry_boundary() {
        let (memory, clock) = memory_with_clock(RETENTION);

        memory.add(42_u64);

        clock.advance(RETENTION - Duration::from_nanos(1));
        assert!(memory.has(&42));

        clock.advance(Duration::from_nanos(1));
        assert!(!memory.has(&42));
        assert!(memory.is_empty());
    }

    #[test]
    fn test_zero_retention_remembers_nothing() {
        let (memory, _) = memory_with_clock(Duration::ZERO);

        memory.add("value");

        assert!(!memory.has(&"value"));
        assert_eq!(memory.len(), 0);
    }

    #[test]
    fn test_purge_keeps_survivors_in_order() {
        let (memory, clock) = memory_with_clock(RETENTION);

        memory.add(1_u32);
        clock.advance(Duration::from_secs(3));
        memory.add(2);
        clock.advance(Duration::from_secs(3));
        memory.add(3);
        clock.advance(Duration::from_secs(5));

        assert_eq!(memory.len(), 2);

        let cells = memory.lock();
        let values: Vec<u32> = cells.iter().map(|cell| *cell.value()).collect();
        assert_eq!(values, vec![2, 3]);
    }

    #[test]
    fn test_purge_on_query() {
        let (memory, clock) = memory_with_clock(RETENTION);

        memory.add("v1");
        clock.advance(RETENTION / 2);
        memory.add("v2");
        clock.advance(Duration::from_secs(7));

        assert_eq!(memory.len(), 1);
        assert!(!memory.has(&"v1"));
        assert!(memory.has(&"v2"));
    }

    #[test]
    fn test_expired_value_is_stored_again() {
        let (memory, clock) = memory_with_clock(RETENTION);

        memory.add("value");
        clock.advance(RETENTION);
        memory.add("value");

        assert_eq!(memory.len(), 1);
        assert!(memory.has(&"value"));
    }

    #[test]
    fn test_check_and_add() {
        let (memory, clock) = memory_with_clock(RETENTION);

        assert!(!memory.check_and_add("value"));
        assert!(memory.check_and_add("value"));
        assert_eq!(memory.len(), 1);

        clock.advance(RETENTION);
        assert!(!memory.check_and_add("value"));
    }

    #[test]
    fn test_not_self_equal_values_are_never_found() {
        let (memory, _) = memory_with_clock(RETENTION);

        memory.add(f64::NAN);
        memory.add(f64::NAN);

        assert!(!memory.has(&f64::NAN));
        assert_eq!(memory.len(), 2);
    }

    #[test]
    fn test_debug_reports_cell_count() {
        let (memory, _) = memory_with_clock(RETENTION);
        memory.add(1_u8);

        let debug = format!("{memory:?}");
        assert!(debug.contains("ShortTermMemory"));
        assert!(debug.contains("cells: 1"));
    }
}
