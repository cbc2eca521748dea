//! PlanBoard task tree store.
//!
//! Holds the set of task nodes and their parent/child relationships
//! behind a pluggable trait, with an in-memory backend sized for one
//! UI session.

#![warn(missing_docs)]

mod trait_;
mod memory;

pub use trait_::{Result, StoreError, TreeStore};
pub use memory::MemoryStore;
