//! Per-version equivalence strategies.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tether_types::{FieldId, ItemVersion};

use crate::filter::{significant_fields, FieldFilter};

/// Decides whether two versions sharing a `(language, number)` key carry the
/// same content.
///
/// Implementations must be symmetric: swapping `serialized` and `live` never
/// changes the answer.
pub trait VersionEquivalence: Send + Sync {
    /// Short name used in logs and configuration.
    fn name(&self) -> &str;

    fn equivalent(
        &self,
        serialized: &ItemVersion,
        live: &ItemVersion,
        filter: &dyn FieldFilter,
    ) -> bool;
}

/// Trusts the live store's change tracking instead of walking fields.
///
/// Two versions are equivalent if **either** their revision stamps are both
/// present and identical as opaque strings, **or** their modification timestamps are both
/// present and denote the same instant. With neither signal usable the
/// versions are treated as different, so the record gets re-synchronized.
///
/// The two signals are independently sufficient. A stale revision paired
/// with a coincidentally equal timestamp therefore reads as "equal".
#[derive(Clone, Copy, Debug, Default)]
pub struct ProxyEquivalence;

impl ProxyEquivalence {
    fn revisions_match(serialized: &ItemVersion, live: &ItemVersion) -> bool {
        match (&serialized.revision, &live.revision) {
            (Some(s), Some(l)) => s == l,
            _ => false,
        }
    }

    fn timestamps_match(serialized: &ItemVersion, live: &ItemVersion) -> bool {
        match (serialized.modified, live.modified) {
            (Some(s), Some(l)) => s == l,
            _ => false,
        }
    }
}

impl VersionEquivalence for ProxyEquivalence {
    fn name(&self) -> &str {
        "proxy"
    }

    fn equivalent(
        &self,
        serialized: &ItemVersion,
        live: &ItemVersion,
        _filter: &dyn FieldFilter,
    ) -> bool {
        Self::revisions_match(serialized, live) || Self::timestamps_match(serialized, live)
    }
}

/// Compares the significant field values of both versions.
///
/// Ignores revision and timestamp entirely. A field present on one side and
/// missing on the other counts as a difference.
#[derive(Clone, Copy, Debug, Default)]
pub struct FieldContentEquivalence;

impl VersionEquivalence for FieldContentEquivalence {
    fn name(&self) -> &str {
        "field_content"
    }

    fn equivalent(
        &self,
        serialized: &ItemVersion,
        live: &ItemVersion,
        filter: &dyn FieldFilter,
    ) -> bool {
        let s: BTreeMap<&FieldId, &str> = significant_fields(serialized, filter).collect();
        let l: BTreeMap<&FieldId, &str> = significant_fields(live, filter).collect();
        s == l
    }
}

/// Serializable choice of equivalence strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquivalenceMode {
    #[default]
    Proxy,
    FieldContent,
}

impl EquivalenceMode {
    pub fn build(self) -> Arc<dyn VersionEquivalence> {
        match self {
            Self::Proxy => Arc::new(ProxyEquivalence),
            Self::FieldContent => Arc::new(FieldContentEquivalence),
        }
    }
}
