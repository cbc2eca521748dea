//! PlanBoard mutation engine.
//!
//! The event router that keeps summary progress consistent across tree
//! mutations, and the adapter that maps externally supplied task
//! records into the tree's internal representation.

#![warn(missing_docs)]

mod router;
mod adapter;

pub use router::Router;
pub use adapter::{ExternalTask, TaskAdapter};
