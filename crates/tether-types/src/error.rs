use thiserror::Error;

use crate::id::RecordId;
use crate::version::VersionKey;

/// Errors produced by type construction and validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("version number must be positive (language {language})")]
    InvalidVersionNumber { language: String },

    #[error("record {record} has more than one version keyed {key}")]
    DuplicateVersion { record: RecordId, key: VersionKey },
}
