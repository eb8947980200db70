//! Field filters: which field ids take part in content comparison.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tether_types::{FieldId, ItemVersion};

/// Predicate over field ids.
///
/// A filter is fixed when the evaluator is built and never changes after.
pub trait FieldFilter: Send + Sync {
    fn includes(&self, field: &FieldId) -> bool;
}

/// Every field is significant.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllFields;

impl FieldFilter for AllFields {
    fn includes(&self, _field: &FieldId) -> bool {
        true
    }
}

/// An explicit set of field ids, used either as an allow-list or a deny-list.
#[derive(Clone, Debug)]
pub struct FieldSet {
    fields: HashSet<FieldId>,
    exclude: bool,
}

impl FieldSet {
    /// Only the listed fields are significant.
    pub fn include(fields: impl IntoIterator<Item = FieldId>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
            exclude: false,
        }
    }

    /// Every field except the listed ones is significant.
    pub fn exclude(fields: impl IntoIterator<Item = FieldId>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
            exclude: true,
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FieldFilter for FieldSet {
    fn includes(&self, field: &FieldId) -> bool {
        self.fields.contains(field) != self.exclude
    }
}

/// Serializable description of a field filter.
///
/// ```toml
/// [filter]
/// mode = "exclude"
/// fields = ["5dd74568-4d4b-44c1-b513-0af5f4cda34f"]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FilterConfig {
    #[default]
    All,
    Include { fields: Vec<FieldId> },
    Exclude { fields: Vec<FieldId> },
}

impl FilterConfig {
    /// Build the filter this configuration describes.
    pub fn build(&self) -> Box<dyn FieldFilter> {
        match self {
            Self::All => Box::new(AllFields),
            Self::Include { fields } => Box::new(FieldSet::include(fields.iter().copied())),
            Self::Exclude { fields } => Box::new(FieldSet::exclude(fields.iter().copied())),
        }
    }
}

/// The fields of `version` that `filter` considers significant.
pub fn significant_fields<'a>(
    version: &'a ItemVersion,
    filter: &'a dyn FieldFilter,
) -> impl Iterator<Item = (&'a FieldId, &'a str)> + 'a {
    version
        .fields
        .iter()
        .filter(move |(id, _)| filter.includes(id))
        .map(|(id, value)| (id, value.as_str()))
}
