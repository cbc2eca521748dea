//! External task adapter.
//!
//! Maps externally supplied task records (opaque string ids, calendar
//! timestamps) into the tree's numeric-id, instant-based nodes. Feeds
//! the store at load time only.

use std::collections::HashSet;

use chrono::Duration;
use planboard_core::{TaskId, TaskNode, Time};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// An externally supplied task record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalTask {
    /// Opaque identifier, possibly non-numeric
    pub id: String,

    /// Scheduled start
    pub start: Time,

    /// Duration in days
    pub duration: f64,

    /// Completion percentage
    pub progress: u8,

    /// Free-text description
    #[serde(default)]
    pub text: String,
}

/// Converts external records into leaf nodes with synthetic numeric
/// ids.
///
/// Stateful over one load session: ids issued so far are tracked, so a
/// collision (two external ids mapping to the same digits) degrades to
/// the positional sequence instead of failing the load.
pub struct TaskAdapter {
    digits: Regex,
    issued: HashSet<TaskId>,
    next_seq: u64,
}

impl TaskAdapter {
    /// Create an adapter for one load session.
    pub fn new() -> Self {
        Self {
            digits: Regex::new(r"\d+").expect("literal pattern"),
            issued: HashSet::new(),
            next_seq: 0,
        }
    }

    /// Adapt one record into a leaf node.
    ///
    /// The numeric id is the concatenation of every digit run in the
    /// external id; records whose id has no digits, or whose digits
    /// collide with an id already issued this session, fall back to the
    /// next free sequence number. Summary/milestone structure is not
    /// present in external sources, so every adapted record is a leaf.
    pub fn adapt(&mut self, record: &ExternalTask) -> TaskNode {
        let id = match self.extract_id(&record.id) {
            Some(id) if !self.issued.contains(&id) => id,
            taken => {
                let fallback = self.next_free_seq();
                match taken {
                    Some(taken) => warn!(
                        "external id {:?} collides with issued id {taken}, using fallback {fallback}",
                        record.id
                    ),
                    None => warn!(
                        "external id {:?} has no digits, using fallback {fallback}",
                        record.id
                    ),
                }
                fallback
            }
        };
        self.issued.insert(id);

        let duration = record.duration.max(0.0);
        let span = Duration::milliseconds((duration * 86_400_000.0) as i64);
        let end = match record.start.checked_add_signed(span) {
            Some(end) => end,
            None => {
                warn!(
                    "external duration {duration} for {:?} overflows the calendar, pinning end to start",
                    record.id
                );
                record.start
            }
        };
        TaskNode::leaf(id, record.start, end, record.progress)
            .with_duration(duration)
            .with_details(record.text.clone())
    }

    fn extract_id(&self, external: &str) -> Option<TaskId> {
        let digits: String = self
            .digits
            .find_iter(external)
            .map(|run| run.as_str())
            .collect();
        if digits.is_empty() {
            return None;
        }
        digits.parse().ok().map(TaskId::new)
    }

    fn next_free_seq(&mut self) -> TaskId {
        loop {
            self.next_seq += 1;
            let id = TaskId::new(self.next_seq);
            if !self.issued.contains(&id) {
                return id;
            }
        }
    }
}

impl Default for TaskAdapter {
    fn default() -> Self {
        Self::new()
    }
}
