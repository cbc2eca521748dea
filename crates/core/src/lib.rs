//! PlanBoard core data models.
//!
//! This crate defines the task-tree entities shared by the store,
//! the progress aggregator, and the mutation event router.

#![warn(missing_docs)]

// Core identities
mod id;

// Task tree
mod task;

// Mutation notifications
mod event;

// Re-exports
pub use id::TaskId;
pub use task::{TaskKind, TaskNode};
pub use event::MutationEvent;

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
