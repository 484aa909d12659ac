//! Short term memory.
//!
//! A short term memory remembers values for a fixed retention period. It is
//! meant to suppress repeated handling of equivalent events, for example
//! skipping an action that was already performed a moment ago.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ ShortTermMemory                              │
//! │   Mutex<Vec<Cell>>   retention   Clock       │
//! │                                              │
//! │   add / has / len / check_and_add            │
//! │     1. lock                                  │
//! │     2. purge cells with age >= retention     │
//! │     3. linear scan with PartialEq            │
//! │     4. refresh, insert or report             │
//! └──────────────────────────────────────────────┘
//! ```

mod builder;
mod cell;
mod short_term;

pub use builder::ShortTermMemoryBuilder;
pub use short_term::ShortTermMemory;
