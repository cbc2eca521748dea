//! Task node model - the unit of the schedule tree.

use crate::id::TaskId;
use crate::Time;
use serde::{Deserialize, Serialize};

/// Role of a node in progress aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskKind {
    /// Progress is set directly and contributes duration-weighted
    /// progress to ancestor summaries.
    Leaf,

    /// Progress is always derived from descendant leaves, never set
    /// directly.
    Summary,

    /// Zero-duration marker; contributes no aggregation weight.
    Milestone,
}

/// A task node in the schedule tree.
///
/// Nodes live in an id-indexed table owned by the store; `parent` is a
/// weak back-reference used for upward traversal only, while `children`
/// lists the owned subtree roots in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskNode {
    /// Unique identifier
    pub id: TaskId,

    /// Aggregation role
    pub kind: TaskKind,

    /// Scheduled start
    pub start: Time,

    /// Scheduled end; equals `start` for milestones
    pub end: Time,

    /// Stored duration in days; derived from the interval when unset
    pub duration: Option<f64>,

    /// Completion percentage in `[0, 100]`
    pub progress: u8,

    /// Weak back-reference to the parent node
    pub parent: Option<TaskId>,

    /// Owned child ids, in display order
    pub children: Vec<TaskId>,

    /// Free-text description
    pub details: String,
}

impl TaskNode {
    /// Create a leaf task over `[start, end]`.
    pub fn leaf(id: TaskId, start: Time, end: Time, progress: u8) -> Self {
        Self {
            id,
            kind: TaskKind::Leaf,
            start,
            end,
            duration: None,
            progress: progress.min(100),
            parent: None,
            children: Vec::new(),
            details: String::new(),
        }
    }

    /// Create a summary task. Its progress starts at zero and is only
    /// ever written by aggregation.
    pub fn summary(id: TaskId, start: Time, end: Time) -> Self {
        Self {
            id,
            kind: TaskKind::Summary,
            start,
            end,
            duration: None,
            progress: 0,
            parent: None,
            children: Vec::new(),
            details: String::new(),
        }
    }

    /// Create a milestone pinned to a single instant.
    pub fn milestone(id: TaskId, at: Time) -> Self {
        Self {
            id,
            kind: TaskKind::Milestone,
            start: at,
            end: at,
            duration: Some(0.0),
            progress: 0,
            parent: None,
            children: Vec::new(),
            details: String::new(),
        }
    }

    /// Set a stored duration, in days.
    pub fn with_duration(mut self, days: f64) -> Self {
        self.duration = Some(days.max(0.0));
        self
    }

    /// Set the free-text description.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    /// Aggregation weight in days: the stored duration, falling back to
    /// the interval length rounded up to whole days. Milestones always
    /// weigh zero.
    pub fn effective_duration(&self) -> f64 {
        if self.kind == TaskKind::Milestone {
            return 0.0;
        }
        match self.duration {
            Some(days) => days.max(0.0),
            None => {
                let seconds = self.end.signed_duration_since(self.start).num_seconds().abs();
                (seconds as f64 / 86_400.0).ceil()
            }
        }
    }

    /// Write the completion percentage, clamped into `[0, 100]`.
    pub fn set_progress(&mut self, progress: u8) {
        self.progress = progress.min(100);
    }

    /// Normalize kind-specific invariants in place: a milestone
    /// collapses to a single instant with zero duration, and progress
    /// stays in range.
    pub fn normalize(&mut self) {
        if self.kind == TaskKind::Milestone {
            self.end = self.start;
            self.duration = Some(0.0);
        }
        self.progress = self.progress.min(100);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(d: u32) -> Time {
        chrono::Utc.with_ymd_and_hms(2024, 3, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_stored_duration_wins() {
        let task = TaskNode::leaf(TaskId::new(1), day(1), day(10), 50).with_duration(4.0);
        assert_eq!(task.effective_duration(), 4.0);
    }

    #[test]
    fn test_derived_duration_rounds_up() {
        // 2 days and 12 hours rounds up to 3.
        let end = day(3) + chrono::Duration::hours(12);
        let task = TaskNode::leaf(TaskId::new(1), day(1), end, 0);
        assert_eq!(task.effective_duration(), 3.0);
    }

    #[test]
    fn test_derived_duration_is_absolute() {
        // Reversed interval still yields a non-negative weight.
        let task = TaskNode::leaf(TaskId::new(1), day(5), day(2), 0);
        assert_eq!(task.effective_duration(), 3.0);
    }

    #[test]
    fn test_milestone_weighs_nothing() {
        let task = TaskNode::milestone(TaskId::new(1), day(1));
        assert_eq!(task.effective_duration(), 0.0);
        assert_eq!(task.start, task.end);
    }

    #[test]
    fn test_progress_clamped() {
        let mut task = TaskNode::leaf(TaskId::new(1), day(1), day(2), 250);
        assert_eq!(task.progress, 100);
        task.set_progress(180);
        assert_eq!(task.progress, 100);
        task.set_progress(35);
        assert_eq!(task.progress, 35);
    }

    #[test]
    fn test_normalize_milestone() {
        let mut task = TaskNode::leaf(TaskId::new(1), day(1), day(4), 120);
        task.kind = TaskKind::Milestone;
        task.normalize();
        assert_eq!(task.end, task.start);
        assert_eq!(task.duration, Some(0.0));
        assert_eq!(task.progress, 100);
    }
}
