use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::id::FieldId;

/// The `(language, number)` pair that identifies a version within a record.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VersionKey {
    pub language: String,
    pub number: u32,
}

impl VersionKey {
    /// Create a key, rejecting a zero version number.
    pub fn new(language: impl Into<String>, number: u32) -> Result<Self, TypeError> {
        let language = language.into();
        if number == 0 {
            return Err(TypeError::InvalidVersionNumber { language });
        }
        Ok(Self { language, number })
    }
}

impl fmt::Debug for VersionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VersionKey({}#{})", self.language, self.number)
    }
}

impl fmt::Display for VersionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.language, self.number)
    }
}

/// Opaque revision stamp. The live store bumps it whenever a version's
/// content changes; Tether only ever compares it for equality.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Revision(String);

impl Revision {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Revision({})", self.0)
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Revision {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

/// One language + version-number slice of a record's content.
///
/// `modified` and `revision` are `None` when the store never set them. They
/// are never defaulted to a sentinel, so "unknown" cannot collide with a real
/// value during comparison.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemVersion {
    pub language: String,
    pub number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<Revision>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<FieldId, String>,
}

impl ItemVersion {
    /// Create an empty version with no metadata and no fields.
    pub fn new(language: impl Into<String>, number: u32) -> Result<Self, TypeError> {
        let key = VersionKey::new(language, number)?;
        Ok(Self {
            language: key.language,
            number: key.number,
            modified: None,
            revision: None,
            fields: BTreeMap::new(),
        })
    }

    pub fn with_revision(mut self, revision: impl Into<Revision>) -> Self {
        self.revision = Some(revision.into());
        self
    }

    pub fn with_modified(mut self, modified: DateTime<Utc>) -> Self {
        self.modified = Some(modified);
        self
    }

    pub fn with_field(mut self, id: FieldId, value: impl Into<String>) -> Self {
        self.fields.insert(id, value.into());
        self
    }

    /// The `(language, number)` key of this version.
    pub fn key(&self) -> VersionKey {
        VersionKey {
            language: self.language.clone(),
            number: self.number,
        }
    }

    /// Returns `true` if this version is keyed by `language` and `number`.
    pub fn has_key(&self, language: &str, number: u32) -> bool {
        self.number == number && self.language == language
    }

    /// The value of a field, if this version carries it.
    pub fn field(&self, id: &FieldId) -> Option<&str> {
        self.fields.get(id).map(String::as_str)
    }
}
