//! PlanBoard progress aggregation.
//!
//! Duration-weighted summary progress, re-derived from leaf state on
//! every call, plus a whole-tree snapshot for hosts that want a fresh
//! view without replaying events.

#![warn(missing_docs)]

mod aggregate;
mod snapshot;

pub use aggregate::aggregate;
pub use snapshot::{snapshot, ProgressSnapshot};
