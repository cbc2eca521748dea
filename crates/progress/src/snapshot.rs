//! Whole-tree progress snapshot.

use chrono::Utc;
use planboard_core::{TaskId, TaskKind, Time};
use planboard_store::TreeStore;

use crate::aggregate;

/// A snapshot of every summary's progress at a point in time.
#[derive(Debug, Clone)]
pub struct ProgressSnapshot {
    /// When the snapshot was taken
    pub timestamp: Time,

    /// Freshly aggregated progress by summary id, in ascending id order
    pub summaries: Vec<(TaskId, u8)>,
}

/// Aggregate every summary in the tree.
///
/// Values are re-derived on the spot, so the snapshot is current even
/// when some summaries have not been touched by a routed event yet.
pub fn snapshot<S: TreeStore>(store: &S) -> ProgressSnapshot {
    let mut summaries = Vec::new();
    for id in store.ids() {
        if let Ok(node) = store.get(id) {
            if node.kind == TaskKind::Summary {
                summaries.push((id, aggregate(store, id)));
            }
        }
    }
    summaries.sort_by_key(|(id, _)| *id);

    ProgressSnapshot {
        timestamp: Utc::now(),
        summaries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use planboard_core::TaskNode;
    use planboard_store::MemoryStore;

    fn day(d: u32) -> Time {
        chrono::Utc.with_ymd_and_hms(2024, 3, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_snapshot_covers_all_summaries() {
        let mut store = MemoryStore::new();
        let top = store
            .insert(TaskNode::summary(TaskId::new(1), day(1), day(10)), None, None)
            .unwrap();
        let nested = store
            .insert(TaskNode::summary(TaskId::new(2), day(1), day(5)), Some(top), None)
            .unwrap();
        store
            .insert(
                TaskNode::leaf(TaskId::new(3), day(1), day(2), 80).with_duration(2.0),
                Some(nested),
                None,
            )
            .unwrap();

        let snap = snapshot(&store);
        assert_eq!(snap.summaries, vec![(top, 80), (nested, 80)]);
    }

    #[test]
    fn test_snapshot_of_empty_tree() {
        let store = MemoryStore::new();
        assert!(snapshot(&store).summaries.is_empty());
    }
}
