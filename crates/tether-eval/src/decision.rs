use std::fmt;

use serde::Serialize;
use tether_compare::Mismatch;
use tether_types::Record;

/// What the evaluator concluded for one record.
///
/// Returned by the planning calls; never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Live and serialized are already in sync.
    NoAction,
    /// Write `target` into the live store. `reason` is `None` when the
    /// record has no live counterpart yet.
    Deserialize {
        target: Record,
        reason: Option<Mismatch>,
    },
    /// Remove this live record.
    Recycle(Record),
}

impl Decision {
    /// Returns `true` if acting on this decision mutates the live store.
    pub fn is_change(&self) -> bool {
        !matches!(self, Self::NoAction)
    }

    /// The record the decision applies to, if any.
    pub fn record(&self) -> Option<&Record> {
        match self {
            Self::NoAction => None,
            Self::Deserialize { target, .. } => Some(target),
            Self::Recycle(record) => Some(record),
        }
    }

    /// Single-letter tag used in sync reports.
    pub fn tag(&self) -> DecisionTag {
        match self {
            Self::NoAction => DecisionTag::Unchanged,
            Self::Deserialize { reason: None, .. } => DecisionTag::Added,
            Self::Deserialize { .. } => DecisionTag::Updated,
            Self::Recycle(_) => DecisionTag::Deleted,
        }
    }
}

/// Outcome of comparing a matched pair.
///
/// A matched pair is only ever left alone or overwritten, so this is
/// narrower than [`Decision`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UpdatePlan {
    /// Live and serialized already match.
    InSync,
    /// The serialized record overwrites the live one.
    Overwrite(Mismatch),
}

impl UpdatePlan {
    pub fn is_change(&self) -> bool {
        matches!(self, Self::Overwrite(_))
    }

    /// The first difference found, if the pair differs.
    pub fn reason(&self) -> Option<&Mismatch> {
        match self {
            Self::InSync => None,
            Self::Overwrite(mismatch) => Some(mismatch),
        }
    }

    pub fn tag(&self) -> DecisionTag {
        match self {
            Self::InSync => DecisionTag::Unchanged,
            Self::Overwrite(_) => DecisionTag::Updated,
        }
    }

    /// Widen into a [`Decision`] targeting `serialized`.
    pub fn into_decision(self, serialized: &Record) -> Decision {
        match self {
            Self::InSync => Decision::NoAction,
            Self::Overwrite(mismatch) => Decision::Deserialize {
                target: serialized.clone(),
                reason: Some(mismatch),
            },
        }
    }
}

/// Report tag for a decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionTag {
    Added,
    Updated,
    Deleted,
    Unchanged,
}

impl fmt::Display for DecisionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::Added => "A",
            Self::Updated => "U",
            Self::Deleted => "D",
            Self::Unchanged => "-",
        };
        f.write_str(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_types::{RecordId, TemplateId};

    fn rec() -> Record {
        Record::new(RecordId::new(), "x", TemplateId::new())
    }

    #[test]
    fn tags() {
        assert_eq!(Decision::NoAction.tag(), DecisionTag::Unchanged);
        assert_eq!(Decision::Recycle(rec()).tag(), DecisionTag::Deleted);
        assert_eq!(
            Decision::Deserialize {
                target: rec(),
                reason: None
            }
            .tag(),
            DecisionTag::Added
        );
        let updated = Decision::Deserialize {
            target: rec(),
            reason: Some(Mismatch::VersionCount {
                serialized: 2,
                live: 1,
            }),
        };
        assert_eq!(updated.tag(), DecisionTag::Updated);
        assert_eq!(updated.tag().to_string(), "U");
    }

    #[test]
    fn update_plan_widens_to_matching_decision() {
        let serialized = rec();
        let mismatch = Mismatch::Name {
            serialized: "a".into(),
            live: "b".into(),
        };
        let plan = UpdatePlan::Overwrite(mismatch.clone());
        assert_eq!(plan.tag(), DecisionTag::Updated);
        assert_eq!(plan.reason(), Some(&mismatch));

        let decision = plan.into_decision(&serialized);
        assert_eq!(decision.tag(), DecisionTag::Updated);
        assert_eq!(decision.record(), Some(&serialized));
        assert_eq!(
            UpdatePlan::InSync.into_decision(&serialized),
            Decision::NoAction
        );
        assert!(!UpdatePlan::InSync.is_change());
    }

    #[test]
    fn no_action_is_not_a_change() {
        assert!(!Decision::NoAction.is_change());
        assert!(Decision::NoAction.record().is_none());
        assert!(Decision::Recycle(rec()).is_change());
    }
}
