//! Duration-weighted progress aggregation.

use planboard_core::{TaskId, TaskKind};
use planboard_store::TreeStore;

/// Derive a node's progress from its descendant leaves.
///
/// Every descendant of `id` is visited through the store table. Leaf
/// descendants contribute `effective_duration() * progress` against a
/// total weight of `effective_duration()`; summaries contribute no
/// weight of their own (their stored progress is ignored and always
/// re-derived); milestones contribute nothing. Missing child ids are
/// skipped silently.
///
/// The result is `round(Σ weight·progress / Σ weight)`, or `0` when the
/// total weight is zero, so the division can never produce NaN or an
/// out-of-range value. Nothing here relies on cached ancestor state:
/// the value is fully re-derived from leaf state on every call, which
/// makes the computation idempotent and tolerant of out-of-order
/// recomputation triggers.
pub fn aggregate<S: TreeStore>(store: &S, id: TaskId) -> u8 {
    let mut total_weight = 0.0;
    let mut weighted_progress = 0.0;
    collect(store, id, &mut total_weight, &mut weighted_progress);

    if total_weight == 0.0 {
        return 0;
    }
    (weighted_progress / total_weight).round().clamp(0.0, 100.0) as u8
}

fn collect<S: TreeStore>(
    store: &S,
    id: TaskId,
    total_weight: &mut f64,
    weighted_progress: &mut f64,
) {
    let Ok(children) = store.children(id) else {
        return;
    };
    for child in children {
        let Ok(node) = store.get(*child) else {
            continue;
        };
        if node.kind == TaskKind::Leaf {
            let weight = node.effective_duration();
            *total_weight += weight;
            *weighted_progress += weight * f64::from(node.progress);
        }
        // Summaries count only through their own leaves; milestones
        // have no children by construction.
        collect(store, *child, total_weight, weighted_progress);
    }
}
