//! Mutation events - notifications that the tree changed.

use crate::id::TaskId;
use serde::{Deserialize, Serialize};

/// A structural mutation notification, as emitted by the rendering
/// widget or by the router's own command wrappers.
///
/// This is a closed union: each variant carries exactly the fields the
/// routing policy needs to pick its recompute target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationEvent {
    /// One existing node reported during the initial-load pass.
    InitialLoad {
        /// The reported node.
        id: TaskId,
    },

    /// A new node was inserted.
    Insert {
        /// The inserted node.
        id: TaskId,
    },

    /// A node's fields were edited in place.
    Update {
        /// The edited node.
        id: TaskId,
    },

    /// A node (and its subtree) was removed. The node itself is gone,
    /// so the event carries the parent it was detached from.
    Delete {
        /// Parent the removed node was detached from; `None` when a
        /// root was removed.
        former_parent: Option<TaskId>,
    },

    /// A node was duplicated.
    Copy {
        /// Root of the newly created copy.
        id: TaskId,
    },

    /// A node was reparented.
    Move {
        /// The moved node.
        id: TaskId,
        /// Parent before the move; `None` when it was a root.
        former_parent: Option<TaskId>,
        /// True for intermediate drag events; only the final drop with
        /// `in_progress == false` is committed to aggregation.
        in_progress: bool,
    },
}

impl MutationEvent {
    /// Short name of the event kind, for log lines.
    pub fn kind_name(&self) -> &'static str {
        match self {
            MutationEvent::InitialLoad { .. } => "initial_load",
            MutationEvent::Insert { .. } => "insert",
            MutationEvent::Update { .. } => "update",
            MutationEvent::Delete { .. } => "delete",
            MutationEvent::Copy { .. } => "copy",
            MutationEvent::Move { .. } => "move",
        }
    }
}
