use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::id::{RecordId, TemplateId};
use crate::version::{ItemVersion, VersionKey};

/// A named, templated content node.
///
/// The same shape describes a live record (read from the data store) and a
/// serialized record (read from disk). Correspondence between the two is
/// established by whoever walks the tree; a `Record` knows nothing about its
/// counterpart.
///
/// Versions carry no required order. Within one record each
/// `(language, number)` key must be unique; [`Record::validate`] checks this
/// for records that arrive through deserialization rather than the builder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<RecordId>,
    pub name: String,
    pub template: TemplateId,
    #[serde(default)]
    pub versions: Vec<ItemVersion>,
}

impl Record {
    /// Create a record with no parent and no versions.
    pub fn new(id: RecordId, name: impl Into<String>, template: TemplateId) -> Self {
        Self {
            id,
            parent: None,
            name: name.into(),
            template,
            versions: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent: RecordId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Append a version, rejecting a key the record already holds.
    pub fn with_version(mut self, version: ItemVersion) -> Result<Self, TypeError> {
        if self.version(&version.language, version.number).is_some() {
            return Err(TypeError::DuplicateVersion {
                record: self.id,
                key: version.key(),
            });
        }
        self.versions.push(version);
        Ok(self)
    }

    /// Look up the version keyed by `language` and `number`.
    pub fn version(&self, language: &str, number: u32) -> Option<&ItemVersion> {
        self.versions.iter().find(|v| v.has_key(language, number))
    }

    /// Number of versions across all languages.
    pub fn version_count(&self) -> usize {
        self.versions.len()
    }

    /// Check the structural invariants of this record.
    pub fn validate(&self) -> Result<(), TypeError> {
        let mut seen: HashSet<VersionKey> = HashSet::with_capacity(self.versions.len());
        for version in &self.versions {
            if version.number == 0 {
                return Err(TypeError::InvalidVersionNumber {
                    language: version.language.clone(),
                });
            }
            let key = version.key();
            if !seen.insert(key.clone()) {
                return Err(TypeError::DuplicateVersion {
                    record: self.id,
                    key,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> Record {
        Record::new(RecordId::new(), "Home", TemplateId::new())
    }

    #[test]
    fn duplicate_version_rejected_by_builder() {
        let err = record()
            .with_version(ItemVersion::new("en", 1).unwrap())
            .unwrap()
            .with_version(ItemVersion::new("en", 1).unwrap())
            .unwrap_err();
        assert!(matches!(err, TypeError::DuplicateVersion { .. }));
    }

    #[test]
    fn same_number_different_language_allowed() {
        let rec = record()
            .with_version(ItemVersion::new("en", 1).unwrap())
            .unwrap()
            .with_version(ItemVersion::new("da", 1).unwrap())
            .unwrap();
        assert_eq!(rec.version_count(), 2);
        assert!(rec.version("da", 1).is_some());
        assert!(rec.version("de", 1).is_none());
        assert!(rec.validate().is_ok());
    }

    #[test]
    fn validate_catches_duplicates_from_deserialization() {
        let mut rec = record();
        rec.versions.push(ItemVersion::new("en", 1).unwrap());
        rec.versions.push(ItemVersion::new("en", 1).unwrap());
        assert!(matches!(
            rec.validate(),
            Err(TypeError::DuplicateVersion { .. })
        ));
    }

    #[test]
    fn validate_catches_zero_version_number() {
        let json = format!(
            r#"{{"id":"{}","name":"x","template":"{}","versions":[{{"language":"en","number":0}}]}}"#,
            RecordId::new(),
            TemplateId::new()
        );
        let rec: Record = serde_json::from_str(&json).unwrap();
        assert!(matches!(
            rec.validate(),
            Err(TypeError::InvalidVersionNumber { .. })
        ));
    }

    #[test]
    fn nil_template_is_valid() {
        let rec = Record::new(RecordId::new(), "x", TemplateId::nil())
            .with_version(ItemVersion::new("en", 1).unwrap())
            .unwrap();
        assert_eq!(rec.validate(), Ok(()));
    }

    #[test]
    fn versions_default_to_empty_when_missing() {
        let json = format!(
            r#"{{"id":"{}","name":"x","template":"{}"}}"#,
            RecordId::new(),
            TemplateId::new()
        );
        let rec: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(rec.version_count(), 0);
        assert_eq!(rec.parent, None);
    }
}
