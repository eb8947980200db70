//! Comparison engine for Tether.
//!
//! Decides whether a serialized record and its live counterpart are already
//! in sync. Equality is structural first (name, template, version set) and
//! then per version, where a pluggable [`VersionEquivalence`] decides whether
//! two versions sharing a `(language, number)` key match.
//!
//! # Key Types
//!
//! - [`Comparator`] -- record equality with the reason for any mismatch
//! - [`FieldFilter`] / [`FieldSet`] / [`AllFields`] -- which fields are significant
//! - [`ProxyEquivalence`] -- revision-or-timestamp rule (the default)
//! - [`FieldContentEquivalence`] -- compares filtered field values instead

pub mod comparator;
pub mod equivalence;
pub mod filter;

pub use comparator::{Comparator, Comparison, Mismatch, Side};
pub use equivalence::{
    EquivalenceMode, FieldContentEquivalence, ProxyEquivalence, VersionEquivalence,
};
pub use filter::{AllFields, FieldFilter, FieldSet, FilterConfig};
