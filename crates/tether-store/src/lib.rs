//! Live-store capabilities for Tether.
//!
//! The evaluator never touches the data store directly. It asks for exactly
//! two effects, each behind a narrow trait:
//!
//! - [`Materializer`] -- write a serialized record's content into the live
//!   store and hand back the resulting live record
//! - [`Recycler`] -- remove a live record
//!
//! # Storage Backends
//!
//! - [`InMemoryLiveStore`] -- `HashMap`-based store for tests, dry runs and
//!   embedding
//!
//! # Design Rules
//!
//! 1. Implementations are `Send + Sync`; the evaluator may be shared across
//!    threads working on different records.
//! 2. Concurrent mutation of the *same* record is the caller's problem.
//! 3. Errors are returned as-is. Nothing here retries.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::{InMemoryLiveStore, StoreOperation};
pub use traits::{Materializer, Recycler};
