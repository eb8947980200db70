//! Sync evaluator for Tether.
//!
//! Given records the tree walker has already classified, the evaluator
//! decides whether the serialized side is authoritative and, when it is,
//! performs the single corrective store call:
//!
//! - **orphans** (live only) are recycled
//! - **new items** (serialized only) are materialized
//! - **matched pairs** are compared and, if they differ, the live record is
//!   overwritten from the serialized one
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use tether_eval::{Evaluator, EvaluatorConfig, RecordingObserver};
//! use tether_store::InMemoryLiveStore;
//! use tether_types::{ItemVersion, Record, RecordId, TemplateId};
//!
//! let live = Record::new(RecordId::new(), "Home", TemplateId::new())
//!     .with_version(ItemVersion::new("en", 1).unwrap().with_revision("r1"))
//!     .unwrap();
//! let mut serialized = live.clone();
//! serialized.name = "Start".into();
//!
//! let store = Arc::new(InMemoryLiveStore::with_records([live.clone()]));
//! let observer = Arc::new(RecordingObserver::new());
//! let evaluator = Evaluator::with_store(store.clone(), observer.clone(), &EvaluatorConfig::default());
//!
//! let updated = evaluator.evaluate_update(&serialized, &live).unwrap();
//! assert_eq!(updated.map(|r| r.name), Some("Start".to_string()));
//! assert_eq!(observer.len(), 1);
//! ```

pub mod config;
pub mod decision;
pub mod error;
pub mod evaluator;
pub mod observer;
pub mod summary;

pub use config::EvaluatorConfig;
pub use decision::{Decision, DecisionTag, UpdatePlan};
pub use error::{EvalError, EvalResult};
pub use evaluator::Evaluator;
pub use observer::{NullObserver, RecordingObserver, SyncEvent, SyncObserver, TracingObserver};
pub use summary::SyncSummary;
