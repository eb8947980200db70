use std::fmt;

use serde::Serialize;
use tether_types::Record;

use crate::decision::{Decision, DecisionTag};

/// Running totals across a tree walk.
///
/// Fed from the evaluator's return values, so callers never re-derive a
/// comparison to count what changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub recycled: usize,
}

impl SyncSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_created(&mut self) {
        self.created += 1;
    }

    /// Count the result of an update evaluation.
    pub fn record_update(&mut self, outcome: Option<&Record>) {
        match outcome {
            Some(_) => self.updated += 1,
            None => self.unchanged += 1,
        }
    }

    pub fn record_recycled(&mut self, count: usize) {
        self.recycled += count;
    }

    /// Count a planned decision (dry runs).
    pub fn record_decision(&mut self, decision: &Decision) {
        self.record_tag(decision.tag());
    }

    /// Count one record under its report tag.
    pub fn record_tag(&mut self, tag: DecisionTag) {
        match tag {
            DecisionTag::Added => self.created += 1,
            DecisionTag::Updated => self.updated += 1,
            DecisionTag::Deleted => self.recycled += 1,
            DecisionTag::Unchanged => self.unchanged += 1,
        }
    }

    /// Records written or removed.
    pub fn changes(&self) -> usize {
        self.created + self.updated + self.recycled
    }

    /// Records looked at.
    pub fn total(&self) -> usize {
        self.changes() + self.unchanged
    }

    pub fn is_clean(&self) -> bool {
        self.changes() == 0
    }
}

impl fmt::Display for SyncSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} added, {} updated, {} deleted, {} unchanged",
            self.created, self.updated, self.recycled, self.unchanged
        )
    }
}
