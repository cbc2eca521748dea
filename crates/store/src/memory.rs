//! In-memory tree store implementation.

use std::collections::HashMap;

use planboard_core::{TaskId, TaskKind, TaskNode};

use super::{Result, StoreError, TreeStore};

/// In-memory store: an id-indexed table of owned nodes plus an ordered
/// root list.
///
/// Traversal always goes through the table, never through live object
/// graphs, so parent back-references cannot form reference cycles. The
/// store's lifetime matches the hosting UI session; persistence belongs
/// to external collaborators.
#[derive(Debug, Default)]
pub struct MemoryStore {
    nodes: HashMap<TaskId, TaskNode>,
    roots: Vec<TaskId>,
    next_id: u64,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the tree holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn detach(&mut self, id: TaskId, parent: Option<TaskId>) {
        match parent {
            Some(parent) => {
                if let Some(node) = self.nodes.get_mut(&parent) {
                    node.children.retain(|child| *child != id);
                }
            }
            None => self.roots.retain(|child| *child != id),
        }
    }

    fn attach(&mut self, id: TaskId, parent: Option<TaskId>, position: Option<usize>) -> Result<()> {
        let list = match parent {
            Some(parent) => {
                &mut self
                    .nodes
                    .get_mut(&parent)
                    .ok_or(StoreError::NotFound(parent))?
                    .children
            }
            None => &mut self.roots,
        };
        let at = position.unwrap_or(list.len()).min(list.len());
        list.insert(at, id);
        Ok(())
    }

    /// True when `candidate` lies inside the subtree rooted at `root`
    /// (including `candidate == root`). Upward walk over parent links.
    fn is_in_subtree(&self, candidate: TaskId, root: TaskId) -> bool {
        let mut cursor = Some(candidate);
        while let Some(current) = cursor {
            if current == root {
                return true;
            }
            cursor = self.nodes.get(&current).and_then(|node| node.parent);
        }
        false
    }

    /// Milestones collapse to a single instant and never take
    /// children; both attachment paths enforce that here.
    fn ensure_can_parent(&self, parent: TaskId) -> Result<()> {
        let node = self.nodes.get(&parent).ok_or(StoreError::NotFound(parent))?;
        if node.kind == TaskKind::Milestone {
            return Err(StoreError::MilestoneParent(parent));
        }
        Ok(())
    }

    fn collect_subtree(&self, id: TaskId, out: &mut Vec<TaskId>) {
        out.push(id);
        if let Some(node) = self.nodes.get(&id) {
            for child in &node.children {
                self.collect_subtree(*child, out);
            }
        }
    }
}

impl TreeStore for MemoryStore {
    fn get(&self, id: TaskId) -> Result<&TaskNode> {
        self.nodes.get(&id).ok_or(StoreError::NotFound(id))
    }

    fn children(&self, id: TaskId) -> Result<&[TaskId]> {
        Ok(&self.get(id)?.children)
    }

    fn parent_of(&self, id: TaskId) -> Result<Option<TaskId>> {
        Ok(self.get(id)?.parent)
    }

    fn roots(&self) -> &[TaskId] {
        &self.roots
    }

    fn ids(&self) -> Vec<TaskId> {
        self.nodes.keys().copied().collect()
    }

    fn allocate_id(&mut self) -> TaskId {
        loop {
            self.next_id += 1;
            let id = TaskId::new(self.next_id);
            if !self.nodes.contains_key(&id) {
                return id;
            }
        }
    }

    fn insert(
        &mut self,
        mut node: TaskNode,
        parent: Option<TaskId>,
        position: Option<usize>,
    ) -> Result<TaskId> {
        let id = node.id;
        if self.nodes.contains_key(&id) {
            return Err(StoreError::DuplicateId(id));
        }
        if let Some(parent) = parent {
            self.ensure_can_parent(parent)?;
        }

        node.parent = parent;
        node.children.clear();
        node.normalize();
        self.nodes.insert(id, node);
        self.attach(id, parent, position)?;
        Ok(id)
    }

    fn update(&mut self, mut node: TaskNode) -> Result<TaskId> {
        let id = node.id;
        let stored = self.nodes.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        node.parent = stored.parent;
        node.children = std::mem::take(&mut stored.children);
        node.normalize();
        *stored = node;
        Ok(id)
    }

    fn set_progress(&mut self, id: TaskId, progress: u8) -> Result<TaskId> {
        let node = self.nodes.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        node.set_progress(progress);
        Ok(id)
    }

    fn remove(&mut self, id: TaskId) -> Result<Option<TaskId>> {
        let former_parent = self.parent_of(id)?;
        let mut subtree = Vec::new();
        self.collect_subtree(id, &mut subtree);
        self.detach(id, former_parent);
        for node in subtree {
            self.nodes.remove(&node);
        }
        Ok(former_parent)
    }

    fn reparent(
        &mut self,
        id: TaskId,
        new_parent: Option<TaskId>,
        position: Option<usize>,
    ) -> Result<Option<TaskId>> {
        let former_parent = self.parent_of(id)?;
        if let Some(parent) = new_parent {
            self.ensure_can_parent(parent)?;
            if self.is_in_subtree(parent, id) {
                return Err(StoreError::CycleDetected { id, parent });
            }
        }

        self.detach(id, former_parent);
        self.attach(id, new_parent, position)?;
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = new_parent;
        }
        Ok(former_parent)
    }
}
