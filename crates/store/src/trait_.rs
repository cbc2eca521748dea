//! Tree store trait abstraction.

use planboard_core::{TaskId, TaskKind, TaskNode};

/// Error type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No live node with the given id
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Insert with an id that is already live
    #[error("duplicate task id: {0}")]
    DuplicateId(TaskId),

    /// Reparent that would put a node under its own subtree
    #[error("move would create cycle: node {id} under parent {parent}")]
    CycleDetected {
        /// The node being moved
        id: TaskId,
        /// The rejected destination parent
        parent: TaskId,
    },

    /// Attach under a milestone, which never has children
    #[error("milestone {0} cannot have children")]
    MilestoneParent(TaskId),
}

/// Store abstraction for the task tree.
///
/// Implementations keep nodes in an id-indexed table: parent links are
/// weak back-references, child lists are ordered and owned. Mutations
/// are atomic with respect to a single caller; there is no internal
/// concurrency.
pub trait TreeStore {
    /// Look up a node.
    fn get(&self, id: TaskId) -> Result<&TaskNode>;

    /// Ordered child ids of a node.
    fn children(&self, id: TaskId) -> Result<&[TaskId]>;

    /// Parent of a node; `None` for roots.
    fn parent_of(&self, id: TaskId) -> Result<Option<TaskId>>;

    /// Root node ids in display order.
    fn roots(&self) -> &[TaskId];

    /// Every live node id, in unspecified order.
    fn ids(&self) -> Vec<TaskId>;

    /// Fresh synthetic id that collides with no live node.
    fn allocate_id(&mut self) -> TaskId;

    /// Insert `node` under `parent` (or as a root when `None`),
    /// splicing it into the child list at `position` or appending.
    /// Any child ids carried by the incoming node are discarded;
    /// subtrees are built by inserting each node. Milestones cannot
    /// take children. Returns the new id.
    fn insert(
        &mut self,
        node: TaskNode,
        parent: Option<TaskId>,
        position: Option<usize>,
    ) -> Result<TaskId>;

    /// Replace a node's field state in place. Structural fields
    /// (parent and child list) are preserved from the stored node so
    /// an edit can never silently reparent; use [`TreeStore::reparent`]
    /// to move. Returns the updated id.
    fn update(&mut self, node: TaskNode) -> Result<TaskId>;

    /// Write a node's progress directly, clamped into range. This is
    /// the aggregation write-back path: it bypasses event routing so a
    /// recompute can never re-trigger itself. Returns the written id.
    fn set_progress(&mut self, id: TaskId, progress: u8) -> Result<TaskId>;

    /// Remove a node and its whole subtree, detaching it from the
    /// former parent's child list. Returns the former parent id so the
    /// caller can re-aggregate around the deletion point.
    fn remove(&mut self, id: TaskId) -> Result<Option<TaskId>>;

    /// Move a subtree under `new_parent` (or to the root list) at
    /// `position`. Rejects moves under the node itself or any of its
    /// descendants, and moves under a milestone. Returns the former
    /// parent id.
    fn reparent(
        &mut self,
        id: TaskId,
        new_parent: Option<TaskId>,
        position: Option<usize>,
    ) -> Result<Option<TaskId>>;

    /// Walk parent links upward looking for a node of `kind`, starting
    /// from `id` itself when `include_self` is set and from its parent
    /// otherwise. Returns `None` when a root is reached without a
    /// match, or when any id on the walk is missing.
    fn nearest_ancestor_of_kind(
        &self,
        id: TaskId,
        kind: TaskKind,
        include_self: bool,
    ) -> Option<TaskId> {
        let mut cursor = if include_self {
            Some(id)
        } else {
            self.parent_of(id).ok().flatten()
        };
        while let Some(current) = cursor {
            match self.get(current) {
                Ok(node) if node.kind == kind => return Some(current),
                Ok(node) => cursor = node.parent,
                Err(_) => return None,
            }
        }
        None
    }
}
