//! Foundation types for Tether.
//!
//! Tether reconciles a tree of *serialized* content records (on disk, under
//! version control) with the *live* records held by a running data store.
//! This crate defines the shapes both sides share. Every other Tether crate
//! depends on `tether-types`.
//!
//! # Key Types
//!
//! - [`Record`] -- A named, templated content node (live or serialized)
//! - [`ItemVersion`] -- One language + version-number slice of a record
//! - [`VersionKey`] -- The `(language, number)` pair identifying a version
//! - [`Revision`] -- Opaque revision stamp written by the live store
//! - [`RecordId`] / [`TemplateId`] / [`FieldId`] -- UUID identifiers

pub mod error;
pub mod id;
pub mod record;
pub mod version;

pub use error::TypeError;
pub use id::{FieldId, RecordId, TemplateId};
pub use record::Record;
pub use version::{ItemVersion, Revision, VersionKey};
