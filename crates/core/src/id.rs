//! Unique identifiers for PlanBoard entities.

use serde::{Deserialize, Serialize};

/// Unique identifier for a task node.
///
/// Ids are plain integers, unique within one tree instance and assigned
/// at insertion time. Externally supplied records are remapped to
/// synthetic ids by the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(u64);

impl TaskId {
    /// Create a TaskId from a raw numeric value.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw numeric value.
    pub fn value(self) -> u64 {
        self.0
    }
}

impl From<u64> for TaskId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
