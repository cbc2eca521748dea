//! Mutation event router.

use planboard_core::{MutationEvent, TaskId, TaskKind, TaskNode};
use planboard_progress::aggregate;
use planboard_store::{Result, TreeStore};
use tracing::{debug, warn};

use crate::adapter::{ExternalTask, TaskAdapter};

/// Routes mutation events to summary recomputations.
///
/// The router takes exclusive ownership of the store at construction
/// and processes one event to completion (recompute and write-back
/// included) before the next; the rendering widget reads through
/// [`Router::store`] and originates mutations through the command
/// wrappers. On teardown [`Router::release`] hands the store back,
/// which also ends the widget-facing insert capability: there is no
/// process-wide registration to leak.
pub struct Router<S: TreeStore> {
    store: S,
}

impl<S: TreeStore> Router<S> {
    /// Create a router over a store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Read access for the rendering widget.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Tear down, handing the store back to the host.
    pub fn release(self) -> S {
        self.store
    }

    /// Seed the tree from external records, then run the initial-load
    /// pass: one routed event per node, so every summary is aggregated
    /// before first paint. Records that cannot be inserted (an adapted
    /// id colliding with a live node) are skipped, never fatal.
    ///
    /// Records land as roots; hierarchy is reconstructed by subsequent
    /// move commands since external sources carry no structure.
    pub fn load(&mut self, records: &[ExternalTask]) -> Vec<TaskId> {
        let mut adapter = TaskAdapter::new();
        let mut loaded = Vec::new();
        for record in records {
            let node = adapter.adapt(record);
            match self.store.insert(node, None, None) {
                Ok(id) => loaded.push(id),
                Err(err) => warn!("skipped external record {:?}: {err}", record.id),
            }
        }

        let mut ids = self.store.ids();
        ids.sort();
        for id in ids {
            self.handle(MutationEvent::InitialLoad { id });
        }
        loaded
    }

    /// Process one mutation event to completion.
    ///
    /// Exactly one aggregate-and-write-back happens per identified
    /// target (two for a finalized move between parents). Propagation
    /// does not continue past the nearest summary; a grandparent
    /// summary refreshes when a later event targets it, or through
    /// `planboard_progress::snapshot`.
    pub fn handle(&mut self, event: MutationEvent) {
        debug!("routing {} event", event.kind_name());
        match event {
            MutationEvent::InitialLoad { id } => self.recompute_nearest(id, true),

            MutationEvent::Insert { id }
            | MutationEvent::Update { id }
            | MutationEvent::Copy { id } => self.recompute_nearest(id, false),

            MutationEvent::Delete { former_parent } => {
                if let Some(former) = former_parent {
                    self.recompute_nearest(former, true);
                }
            }

            MutationEvent::Move {
                in_progress: true, ..
            } => {
                // Intermediate drag states are never committed.
            }

            MutationEvent::Move {
                id,
                former_parent,
                in_progress: false,
            } => {
                let current_parent = self.store.parent_of(id).ok().flatten();
                if former_parent != current_parent {
                    if let Some(former) = former_parent {
                        self.recompute_nearest(former, true);
                    }
                }
                self.recompute_nearest(id, false);
            }
        }
    }

    /// Insert a node under `parent` and route the insert event. This is
    /// the capability handed to the widget for "add child under P"
    /// commands.
    pub fn insert_child(&mut self, parent: TaskId, node: TaskNode) -> Result<TaskId> {
        let id = self.store.insert(node, Some(parent), None)?;
        self.handle(MutationEvent::Insert { id });
        Ok(id)
    }

    /// Insert a root node and route the insert event.
    pub fn insert_root(&mut self, node: TaskNode) -> Result<TaskId> {
        let id = self.store.insert(node, None, None)?;
        self.handle(MutationEvent::Insert { id });
        Ok(id)
    }

    /// Edit a node's fields in place and route the update event.
    pub fn update(&mut self, node: TaskNode) -> Result<TaskId> {
        let id = self.store.update(node)?;
        self.handle(MutationEvent::Update { id });
        Ok(id)
    }

    /// Remove a subtree and route the delete event. Returns the former
    /// parent id.
    pub fn remove(&mut self, id: TaskId) -> Result<Option<TaskId>> {
        let former_parent = self.store.remove(id)?;
        self.handle(MutationEvent::Delete { former_parent });
        Ok(former_parent)
    }

    /// Reparent a subtree and route the move event. Pass `in_progress`
    /// for intermediate drag positions: the tree still mutates, but
    /// recomputation is suppressed until the final drop.
    pub fn move_task(
        &mut self,
        id: TaskId,
        new_parent: Option<TaskId>,
        position: Option<usize>,
        in_progress: bool,
    ) -> Result<Option<TaskId>> {
        let former_parent = self.store.reparent(id, new_parent, position)?;
        self.handle(MutationEvent::Move {
            id,
            former_parent,
            in_progress,
        });
        Ok(former_parent)
    }

    /// Deep-copy the subtree rooted at `source` under `parent` with
    /// fresh ids, then route one copy event for the new subtree root.
    pub fn copy(&mut self, source: TaskId, parent: Option<TaskId>) -> Result<TaskId> {
        let new_root = self.copy_subtree(source, parent)?;
        self.handle(MutationEvent::Copy { id: new_root });
        Ok(new_root)
    }

    fn copy_subtree(&mut self, source: TaskId, parent: Option<TaskId>) -> Result<TaskId> {
        let mut template = self.store.get(source)?.clone();
        let children = std::mem::take(&mut template.children);
        template.id = self.store.allocate_id();
        let new_id = self.store.insert(template, parent, None)?;
        for child in children {
            self.copy_subtree(child, Some(new_id))?;
        }
        Ok(new_id)
    }

    /// One aggregate-and-write-back on the nearest summary. The write
    /// goes through the store's direct progress path, so it can never
    /// re-enter the router as an update event. A missing target is a
    /// silent skip: the tree may be transiently inconsistent during a
    /// batch of widget-originated events.
    fn recompute_nearest(&mut self, id: TaskId, include_self: bool) {
        let Some(target) =
            self.store
                .nearest_ancestor_of_kind(id, TaskKind::Summary, include_self)
        else {
            debug!("no summary ancestor for {id}, nothing to recompute");
            return;
        };
        let value = aggregate(&self.store, target);
        match self.store.set_progress(target, value) {
            Ok(_) => debug!("summary {target} recomputed to {value}%"),
            Err(_) => debug!("summary {target} vanished before write-back, skipped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use planboard_core::Time;
    use planboard_store::MemoryStore;

    fn day(d: u32) -> Time {
        chrono::Utc.with_ymd_and_hms(2024, 3, d, 0, 0, 0).unwrap()
    }

    fn leaf(id: u64, duration: f64, progress: u8) -> TaskNode {
        TaskNode::leaf(TaskId::new(id), day(1), day(2), progress).with_duration(duration)
    }

    fn summary(id: u64) -> TaskNode {
        TaskNode::summary(TaskId::new(id), day(1), day(20))
    }

    fn record(id: &str, duration: f64, progress: u8) -> ExternalTask {
        ExternalTask {
            id: id.to_string(),
            start: day(1),
            duration,
            progress,
            text: String::new(),
        }
    }

    /// Summary with two leaves; returns (router, summary, leaf ids).
    fn small_tree() -> (Router<MemoryStore>, TaskId, TaskId, TaskId) {
        let mut store = MemoryStore::new();
        let s = store.insert(summary(1), None, None).unwrap();
        let a = store.insert(leaf(2, 4.0, 50), Some(s), None).unwrap();
        let b = store.insert(leaf(3, 6.0, 100), Some(s), None).unwrap();
        (Router::new(store), s, a, b)
    }

    #[test]
    fn test_insert_recomputes_parent_summary() {
        let mut store = MemoryStore::new();
        let s = store.insert(summary(1), None, None).unwrap();
        let mut router = Router::new(store);

        router.insert_child(s, leaf(2, 4.0, 50)).unwrap();
        assert_eq!(router.store().get(s).unwrap().progress, 50);

        router.insert_child(s, leaf(3, 6.0, 100)).unwrap();
        assert_eq!(router.store().get(s).unwrap().progress, 80);
    }

    #[test]
    fn test_inserted_summary_does_not_aggregate_itself() {
        let (mut router, s, _, _) = small_tree();
        router.handle(MutationEvent::InitialLoad { id: s });
        assert_eq!(router.store().get(s).unwrap().progress, 80);

        // A brand-new nested summary targets its ancestor, not itself.
        let nested = router.insert_child(s, summary(10)).unwrap();
        assert_eq!(router.store().get(nested).unwrap().progress, 0);
        assert_eq!(router.store().get(s).unwrap().progress, 80);
    }

    #[test]
    fn test_update_recomputes_nearest_summary() {
        let (mut router, s, a, _) = small_tree();

        router.update(leaf(a.value(), 4.0, 100)).unwrap();
        // round((4*100 + 6*100) / 10) == 100
        assert_eq!(router.store().get(s).unwrap().progress, 100);
    }

    #[test]
    fn test_external_summary_write_is_overwritten() {
        let (mut router, s, a, _) = small_tree();

        // A stray external write to a summary's progress is corrected
        // on the next routed event.
        let mut edited = summary(s.value());
        edited.progress = 7;
        router.update(edited).unwrap();
        router.handle(MutationEvent::Update { id: a });
        assert_eq!(router.store().get(s).unwrap().progress, 80);
    }

    #[test]
    fn test_delete_targets_former_parent() {
        let (mut router, s, a, b) = small_tree();

        router.remove(a).unwrap();
        assert_eq!(router.store().get(s).unwrap().progress, 100);

        router.remove(b).unwrap();
        // No qualifying leaves left.
        assert_eq!(router.store().get(s).unwrap().progress, 0);
    }

    #[test]
    fn test_delete_root_is_a_no_op() {
        let (mut router, s, _, _) = small_tree();
        let before = router.store().get(s).unwrap().progress;
        router.handle(MutationEvent::Delete { former_parent: None });
        assert_eq!(router.store().get(s).unwrap().progress, before);
    }

    #[test]
    fn test_drag_in_progress_is_suppressed() {
        let mut store = MemoryStore::new();
        let a = store.insert(summary(1), None, None).unwrap();
        let b = store.insert(summary(2), None, None).unwrap();
        let child = store.insert(leaf(3, 5.0, 60), Some(a), None).unwrap();
        let mut router = Router::new(store);

        router.move_task(child, Some(b), None, true).unwrap();
        // The tree moved but no progress changed anywhere.
        assert_eq!(router.store().parent_of(child).unwrap(), Some(b));
        assert_eq!(router.store().get(a).unwrap().progress, 0);
        assert_eq!(router.store().get(b).unwrap().progress, 0);
    }

    #[test]
    fn test_finalized_move_updates_both_summaries() {
        let mut store = MemoryStore::new();
        let a = store.insert(summary(1), None, None).unwrap();
        let b = store.insert(summary(2), None, None).unwrap();
        let child = store.insert(leaf(3, 5.0, 60), Some(a), None).unwrap();
        store.insert(leaf(4, 5.0, 20), Some(a), None).unwrap();
        let mut router = Router::new(store);
        router.handle(MutationEvent::InitialLoad { id: child });
        assert_eq!(router.store().get(a).unwrap().progress, 40);

        router.move_task(child, Some(b), None, false).unwrap();
        assert_eq!(router.store().get(a).unwrap().progress, 20);
        assert_eq!(router.store().get(b).unwrap().progress, 60);
    }

    #[test]
    fn test_reorder_within_parent_recomputes_once() {
        let (mut router, s, a, b) = small_tree();

        router.move_task(a, Some(s), Some(1), false).unwrap();
        assert_eq!(router.store().children(s).unwrap(), &[b, a]);
        assert_eq!(router.store().get(s).unwrap().progress, 80);
    }

    #[test]
    fn test_copy_duplicates_subtree_and_recomputes() {
        let mut store = MemoryStore::new();
        let src = store.insert(summary(1), None, None).unwrap();
        store.insert(leaf(2, 2.0, 100), Some(src), None).unwrap();
        let dst = store.insert(summary(3), None, None).unwrap();
        let mut router = Router::new(store);

        let copied = router.copy(src, Some(dst)).unwrap();
        assert_ne!(copied, src);
        assert_eq!(router.store().children(copied).unwrap().len(), 1);
        assert_eq!(router.store().get(dst).unwrap().progress, 100);
        // The source tree is untouched.
        assert_eq!(router.store().children(src).unwrap().len(), 1);
    }

    #[test]
    fn test_load_seeds_and_aggregates() {
        let mut store = MemoryStore::new();
        let s = store.insert(summary(100), None, None).unwrap();
        let mut router = Router::new(store);

        let loaded = router.load(&[record("t1", 4.0, 50), record("t2", 6.0, 100)]);
        assert_eq!(loaded, vec![TaskId::new(1), TaskId::new(2)]);

        for id in &loaded {
            router.move_task(*id, Some(s), None, false).unwrap();
        }
        assert_eq!(router.store().get(s).unwrap().progress, 80);
    }

    #[test]
    fn test_load_skips_colliding_records() {
        let mut store = MemoryStore::new();
        store.insert(leaf(5, 1.0, 0), None, None).unwrap();
        let mut router = Router::new(store);

        // The adapted id 5 is already live in the store.
        let loaded = router.load(&[record("t5", 1.0, 0)]);
        assert!(loaded.is_empty());
        assert_eq!(router.store().ids().len(), 1);
    }

    #[test]
    fn test_events_on_missing_ids_are_silent() {
        let (mut router, s, _, _) = small_tree();
        let before = router.store().get(s).unwrap().progress;

        router.handle(MutationEvent::Update { id: TaskId::new(99) });
        router.handle(MutationEvent::Insert { id: TaskId::new(98) });
        router.handle(MutationEvent::Delete {
            former_parent: Some(TaskId::new(97)),
        });
        assert_eq!(router.store().get(s).unwrap().progress, before);
    }

    #[test]
    fn test_release_returns_store() {
        let (router, s, _, _) = small_tree();
        let store = router.release();
        assert!(store.get(s).is_ok());
    }
}
