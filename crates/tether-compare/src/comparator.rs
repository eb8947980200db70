//! Record-level equality between a serialized record and a live record.

use std::fmt;
use std::sync::Arc;

use tether_types::{Record, TemplateId, VersionKey};
use tracing::trace;

use crate::equivalence::{ProxyEquivalence, VersionEquivalence};
use crate::filter::{AllFields, FieldFilter};

/// Which side of a comparison a value came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Serialized,
    Live,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serialized => f.write_str("serialized"),
            Self::Live => f.write_str("live"),
        }
    }
}

/// The first reason a serialized record was found to differ from its live
/// counterpart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mismatch {
    /// Display names differ (case-sensitive).
    Name { serialized: String, live: String },
    /// Template ids differ.
    Template {
        serialized: TemplateId,
        live: TemplateId,
    },
    /// The records hold a different number of versions.
    VersionCount { serialized: usize, live: usize },
    /// A version key on one side has no counterpart on the other.
    MissingVersion {
        key: VersionKey,
        /// The side the key is missing from.
        missing_from: Side,
    },
    /// Both sides hold the version but it did not compare equivalent.
    VersionChanged { key: VersionKey },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name { serialized, live } => {
                write!(f, "name differs: serialized {serialized:?}, live {live:?}")
            }
            Self::Template { serialized, live } => {
                write!(f, "template differs: serialized {serialized}, live {live}")
            }
            Self::VersionCount { serialized, live } => {
                write!(f, "version count differs: serialized {serialized}, live {live}")
            }
            Self::MissingVersion { key, missing_from } => {
                write!(f, "version {key} missing from {missing_from} record")
            }
            Self::VersionChanged { key } => write!(f, "version {key} changed"),
        }
    }
}

/// Outcome of comparing two records.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    Different(Mismatch),
}

impl Comparison {
    pub fn is_equal(&self) -> bool {
        matches!(self, Self::Equal)
    }

    pub fn mismatch(&self) -> Option<&Mismatch> {
        match self {
            Self::Equal => None,
            Self::Different(m) => Some(m),
        }
    }
}

/// Decides whether a serialized record and a live record are in sync.
///
/// Checks run in a fixed order and stop at the first difference:
///
/// 1. display name (exact, case-sensitive)
/// 2. template id
/// 3. number of versions
/// 4. every version key present on both sides
/// 5. every matched version pair passes the [`VersionEquivalence`] strategy
///
/// Two records without versions are equal when name and template match.
///
/// The comparator holds only immutable, shared state and can be cloned
/// freely across threads.
#[derive(Clone)]
pub struct Comparator {
    filter: Arc<dyn FieldFilter>,
    equivalence: Arc<dyn VersionEquivalence>,
}

impl Comparator {
    pub fn new(filter: Arc<dyn FieldFilter>, equivalence: Arc<dyn VersionEquivalence>) -> Self {
        Self {
            filter,
            equivalence,
        }
    }

    /// Revision-or-timestamp comparison with the given field filter.
    pub fn with_filter(filter: Arc<dyn FieldFilter>) -> Self {
        Self::new(filter, Arc::new(ProxyEquivalence))
    }

    /// The field filter in effect.
    pub fn filter(&self) -> &dyn FieldFilter {
        self.filter.as_ref()
    }

    /// Name of the version equivalence strategy in effect.
    pub fn strategy(&self) -> &str {
        self.equivalence.name()
    }

    /// Returns `true` if `serialized` and `live` are in sync.
    pub fn are_equal(&self, serialized: &Record, live: &Record) -> bool {
        self.compare(serialized, live).is_equal()
    }

    /// Compare two records, reporting the first difference found.
    pub fn compare(&self, serialized: &Record, live: &Record) -> Comparison {
        let result = self.compare_inner(serialized, live);
        if let Comparison::Different(mismatch) = &result {
            trace!(id = %serialized.id, %mismatch, "records differ");
        }
        result
    }

    fn compare_inner(&self, serialized: &Record, live: &Record) -> Comparison {
        if serialized.name != live.name {
            return Comparison::Different(Mismatch::Name {
                serialized: serialized.name.clone(),
                live: live.name.clone(),
            });
        }

        if serialized.template != live.template {
            return Comparison::Different(Mismatch::Template {
                serialized: serialized.template,
                live: live.template,
            });
        }

        if serialized.version_count() != live.version_count() {
            return Comparison::Different(Mismatch::VersionCount {
                serialized: serialized.version_count(),
                live: live.version_count(),
            });
        }

        let mut pairs = Vec::with_capacity(serialized.versions.len());
        for version in &serialized.versions {
            match live.version(&version.language, version.number) {
                Some(counterpart) => pairs.push((version, counterpart)),
                None => {
                    return Comparison::Different(Mismatch::MissingVersion {
                        key: version.key(),
                        missing_from: Side::Live,
                    })
                }
            }
        }
        // Counts match, but a record carrying a duplicate key could still
        // hide a live-only version from the pass above.
        for version in &live.versions {
            if serialized.version(&version.language, version.number).is_none() {
                return Comparison::Different(Mismatch::MissingVersion {
                    key: version.key(),
                    missing_from: Side::Serialized,
                });
            }
        }

        for (s, l) in pairs {
            if !self.equivalence.equivalent(s, l, self.filter.as_ref()) {
                return Comparison::Different(Mismatch::VersionChanged { key: s.key() });
            }
        }

        Comparison::Equal
    }
}

impl Default for Comparator {
    fn default() -> Self {
        Self::with_filter(Arc::new(AllFields))
    }
}

impl fmt::Debug for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Comparator")
            .field("strategy", &self.strategy())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equivalence::FieldContentEquivalence;
    use crate::filter::FieldSet;
    use chrono::{DateTime, TimeZone, Utc};
    use proptest::prelude::*;
    use tether_types::{FieldId, ItemVersion, RecordId};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn version(lang: &str, n: u32, rev: &str) -> ItemVersion {
        ItemVersion::new(lang, n).unwrap().with_revision(rev)
    }

    fn record(name: &str, template: TemplateId, versions: Vec<ItemVersion>) -> Record {
        let mut rec = Record::new(RecordId::new(), name, template);
        for v in versions {
            rec = rec.with_version(v).unwrap();
        }
        rec
    }

    // -----------------------------------------------------------------------
    // Structural checks
    // -----------------------------------------------------------------------

    #[test]
    fn identical_records_are_equal() {
        let t = TemplateId::new();
        let s = record("NAME", t, vec![version("en", 1, "REVISION")]);
        let l = record("NAME", t, vec![version("en", 1, "REVISION")]);
        assert_eq!(Comparator::default().compare(&s, &l), Comparison::Equal);
    }

    #[test]
    fn name_difference_detected() {
        let t = TemplateId::new();
        let s = record("SERIALIZED", t, vec![version("en", 1, "REVISION")]);
        let l = record("NAME", t, vec![version("en", 1, "REVISION")]);
        let result = Comparator::default().compare(&s, &l);
        assert_eq!(
            result.mismatch(),
            Some(&Mismatch::Name {
                serialized: "SERIALIZED".into(),
                live: "NAME".into()
            })
        );
    }

    #[test]
    fn name_comparison_is_case_sensitive() {
        let t = TemplateId::new();
        let s = record("home", t, vec![]);
        let l = record("Home", t, vec![]);
        assert!(!Comparator::default().are_equal(&s, &l));
    }

    #[test]
    fn template_difference_detected() {
        let s = record("NAME", TemplateId::new(), vec![version("en", 1, "r")]);
        let l = record("NAME", TemplateId::new(), vec![version("en", 1, "r")]);
        assert!(matches!(
            Comparator::default().compare(&s, &l),
            Comparison::Different(Mismatch::Template { .. })
        ));
    }

    #[test]
    fn version_count_difference_detected() {
        let t = TemplateId::new();
        let s = record("NAME", t, vec![version("en", 1, "r"), version("en", 2, "r")]);
        let l = record("NAME", t, vec![version("en", 1, "r")]);
        assert_eq!(
            Comparator::default().compare(&s, &l).mismatch(),
            Some(&Mismatch::VersionCount {
                serialized: 2,
                live: 1
            })
        );
    }

    #[test]
    fn unmatched_version_key_detected() {
        let t = TemplateId::new();
        let s = record("NAME", t, vec![version("da", 1, "r")]);
        let l = record("NAME", t, vec![version("en", 1, "r")]);
        assert_eq!(
            Comparator::default().compare(&s, &l).mismatch(),
            Some(&Mismatch::MissingVersion {
                key: VersionKey::new("da", 1).unwrap(),
                missing_from: Side::Live
            })
        );
    }

    #[test]
    fn live_only_key_behind_duplicate_detected() {
        let t = TemplateId::new();
        let mut s = record("NAME", t, vec![version("en", 1, "r")]);
        s.versions.push(version("en", 1, "r"));
        let l = record("NAME", t, vec![version("en", 1, "r"), version("en", 2, "r")]);
        assert_eq!(
            Comparator::default().compare(&s, &l).mismatch(),
            Some(&Mismatch::MissingVersion {
                key: VersionKey::new("en", 2).unwrap(),
                missing_from: Side::Serialized
            })
        );
    }

    #[test]
    fn empty_version_sets_are_equal() {
        let t = TemplateId::new();
        assert!(Comparator::default().are_equal(&record("A", t, vec![]), &record("A", t, vec![])));
    }

    #[test]
    fn version_order_is_irrelevant() {
        let t = TemplateId::new();
        let s = record("A", t, vec![version("en", 1, "a"), version("da", 1, "b")]);
        let l = record("A", t, vec![version("da", 1, "b"), version("en", 1, "a")]);
        assert!(Comparator::default().are_equal(&s, &l));
    }

    // -----------------------------------------------------------------------
    // Version tie-breaks
    // -----------------------------------------------------------------------

    #[test]
    fn revision_match_suffices_with_differing_timestamps() {
        let t = TemplateId::new();
        let s = record("A", t, vec![version("en", 1, "r1").with_modified(at(1))]);
        let l = record("A", t, vec![version("en", 1, "r1").with_modified(at(2))]);
        assert!(Comparator::default().are_equal(&s, &l));
    }

    #[test]
    fn timestamp_match_suffices_with_differing_revisions() {
        let t = TemplateId::new();
        let s = record("A", t, vec![version("en", 1, "r1").with_modified(at(5))]);
        let l = record("A", t, vec![version("en", 1, "r2").with_modified(at(5))]);
        assert!(Comparator::default().are_equal(&s, &l));
    }

    #[test]
    fn one_changed_version_among_many() {
        let t = TemplateId::new();
        let s = record("A", t, vec![version("en", 1, "a"), version("en", 2, "b")]);
        let l = record("A", t, vec![version("en", 1, "a"), version("en", 2, "c")]);
        assert_eq!(
            Comparator::default().compare(&s, &l).mismatch(),
            Some(&Mismatch::VersionChanged {
                key: VersionKey::new("en", 2).unwrap()
            })
        );
    }

    #[test]
    fn missing_metadata_resolves_to_different() {
        let t = TemplateId::new();
        let bare = || ItemVersion::new("en", 1).unwrap();
        let s = record("A", t, vec![bare()]);
        let l = record("A", t, vec![bare()]);
        assert!(!Comparator::default().are_equal(&s, &l));
    }

    #[test]
    fn content_strategy_uses_filter() {
        let t = TemplateId::new();
        let title = FieldId::new();
        let noise = FieldId::new();
        let s = record(
            "A",
            t,
            vec![version("en", 1, "r1").with_field(title, "x").with_field(noise, "1")],
        );
        let l = record(
            "A",
            t,
            vec![version("en", 1, "r2").with_field(title, "x").with_field(noise, "2")],
        );
        let comparator = Comparator::new(
            Arc::new(FieldSet::exclude([noise])),
            Arc::new(FieldContentEquivalence),
        );
        assert!(comparator.are_equal(&s, &l));
        assert_eq!(comparator.strategy(), "field_content");
        assert!(!comparator.filter().includes(&noise));
    }

    // -----------------------------------------------------------------------
    // Symmetry
    // -----------------------------------------------------------------------

    fn arb_version() -> impl Strategy<Value = (Option<&'static str>, Option<i64>)> {
        (
            prop::option::of(prop::sample::select(vec!["r1", "r2"])),
            prop::option::of(0i64..2),
        )
    }

    fn arb_record(template: TemplateId) -> impl Strategy<Value = Record> {
        (
            prop::sample::select(vec!["A", "B"]),
            prop::collection::btree_map(
                (prop::sample::select(vec!["en", "da"]), 1u32..3),
                arb_version(),
                0..4,
            ),
        )
            .prop_map(move |(name, versions)| {
                let mut rec = Record::new(RecordId::nil(), name, template);
                for ((lang, n), (rev, ts)) in versions {
                    let mut v = ItemVersion::new(lang, n).unwrap();
                    if let Some(rev) = rev {
                        v = v.with_revision(rev);
                    }
                    if let Some(ts) = ts {
                        v = v.with_modified(at(ts));
                    }
                    rec = rec.with_version(v).unwrap();
                }
                rec
            })
    }

    proptest! {
        #[test]
        fn swapping_sides_preserves_result(
            a in arb_record(TemplateId::nil()),
            b in arb_record(TemplateId::nil()),
        ) {
            let comparator = Comparator::default();
            prop_assert_eq!(comparator.are_equal(&a, &b), comparator.are_equal(&b, &a));
        }

        #[test]
        fn record_with_revisions_equals_itself(a in arb_record(TemplateId::nil())) {
            let all_stamped = a.versions.iter().all(|v| v.revision.is_some() || v.modified.is_some());
            prop_assert_eq!(Comparator::default().are_equal(&a, &a), all_stamped);
        }
    }
}
