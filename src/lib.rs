//! # Short Term Memory
//!
//! A concurrent, self-purging memory that remembers values for a bounded
//! time.
//!
//! It answers one question: "was an equal value seen recently?". Callers
//! use it to avoid repeating work, such as performing the same healing
//! action twice within a few minutes.
//!
//! ## Features
//!
//! - Structural equality through [`PartialEq`], no hashing required
//! - Lazy, age-based expiry on every access, with no background thread
//! - A single lock per call, so every operation is atomic
//! - Pluggable time source for deterministic tests
//!
//! ## Example
//!
//! ```rust
//! use short_term_memory::ShortTermMemoryBuilder;
//! use std::time::Duration;
//!
//! #[derive(Debug, PartialEq)]
//! struct Action {
//!     name: String,
//!     node: String,
//! }
//!
//! let memory = ShortTermMemoryBuilder::new()
//!     .with_retention(Duration::from_secs(300))
//!     .build()?;
//!
//! let action = Action { name: "reboot".into(), node: "node-7".into() };
//! if !memory.check_and_add(action) {
//!     // first time: perform the action
//! }
//!
//! let again = Action { name: "reboot".into(), node: "node-7".into() };
//! assert!(memory.has(&again));
//! # Ok::<(), short_term_memory::Error>(())
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

use thiserror::Error as ThisError;

// Module declarations
pub mod clock;
pub mod config;
pub mod memory;
pub mod observability;

// Re-exports for convenience
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::MemoryConfig;
pub use memory::{ShortTermMemory, ShortTermMemoryBuilder};

/// Error type for short term memory operations.
///
/// Memory operations themselves never fail; errors come from the
/// configuration and logging layers.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Malformed config file, invalid log filter directive |
/// | `OperationFailed` | Config or log file I/O fails, logging initialized twice |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Result type alias for short term memory operations.
pub type Result<T> = std::result::Result<T, Error>;
