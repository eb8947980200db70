use std::sync::Arc;

use tether_compare::{Comparator, Comparison};
use tether_store::{Materializer, Recycler};
use tether_types::Record;
use tracing::debug;

use crate::config::EvaluatorConfig;
use crate::decision::{Decision, UpdatePlan};
use crate::error::EvalResult;
use crate::observer::SyncObserver;

/// Updates and new items are written shallowly: only the record's own
/// content, never its live subtree.
const OVERWRITE_CHILDREN: bool = false;

// ---------------------------------------------------------------------------
// Evaluator
// ---------------------------------------------------------------------------

/// Decides whether serialized records are authoritative over live records,
/// and carries out the one corrective action each case calls for.
///
/// The evaluator does not discover which records are orphans, new, or
/// matched pairs; the tree walker hands them over already classified. Each
/// entry point is an independent, stateless call:
///
/// | entry point                          | store call                  | observer       |
/// |--------------------------------------|-----------------------------|----------------|
/// | [`Self::evaluate_orphans`]           | `recycle` once per record   | `on_recycled`  |
/// | [`Self::evaluate_new_serialized_item`] | `deserialize` once, shallow | `on_created`   |
/// | [`Self::evaluate_update`]            | `deserialize` once if different, shallow | `on_updated` |
///
/// The observer is told only after the store call succeeds. Store errors are
/// returned unchanged and nothing is retried or rolled back.
///
/// All collaborators are fixed at construction and only read afterwards, so
/// one evaluator can serve many threads working on different records.
pub struct Evaluator {
    materializer: Arc<dyn Materializer>,
    recycler: Arc<dyn Recycler>,
    observer: Arc<dyn SyncObserver>,
    comparator: Comparator,
}

impl Evaluator {
    pub fn new(
        materializer: Arc<dyn Materializer>,
        recycler: Arc<dyn Recycler>,
        observer: Arc<dyn SyncObserver>,
        comparator: Comparator,
    ) -> Self {
        Self {
            materializer,
            recycler,
            observer,
            comparator,
        }
    }

    /// Build an evaluator over a store that both materializes and recycles.
    pub fn with_store<S>(
        store: Arc<S>,
        observer: Arc<dyn SyncObserver>,
        config: &EvaluatorConfig,
    ) -> Self
    where
        S: Materializer + Recycler + 'static,
    {
        Self::new(store.clone(), store, observer, config.comparator())
    }

    /// The comparator used for matched pairs.
    pub fn comparator(&self) -> &Comparator {
        &self.comparator
    }

    // -----------------------------------------------------------------------
    // Entry points
    // -----------------------------------------------------------------------

    /// Recycle every live record in `live`, in order.
    ///
    /// Every record handed over is by definition an orphan; there is no
    /// decision to make. Stops at the first store failure, leaving the rest
    /// of the slice untouched.
    pub fn evaluate_orphans(&self, live: &[Record]) -> EvalResult<()> {
        for record in live {
            debug!(id = %record.id, name = %record.name, "recycling orphan");
            self.recycler.recycle(record)?;
            self.observer.on_recycled(record);
        }
        Ok(())
    }

    /// Materialize a serialized record that has no live counterpart.
    ///
    /// Returns the newly created live record.
    pub fn evaluate_new_serialized_item(&self, serialized: &Record) -> EvalResult<Record> {
        serialized.validate()?;

        debug!(id = %serialized.id, name = %serialized.name, "materializing new record");
        let created = self.materializer.deserialize(serialized, OVERWRITE_CHILDREN)?;
        self.observer.on_created(&created);
        Ok(created)
    }

    /// Reconcile a serialized record with its live counterpart.
    ///
    /// Returns `None` when the two already match. Otherwise the live record is
    /// overwritten from the serialized one and the materialized record is
    /// returned.
    pub fn evaluate_update(
        &self,
        serialized: &Record,
        live: &Record,
    ) -> EvalResult<Option<Record>> {
        let plan = self.decide_update(serialized, live)?;
        self.apply_update(serialized, plan)
    }

    /// Carry out a plan from [`Self::decide_update`] for `serialized`.
    ///
    /// Lets a caller that already planned the pair act on it without
    /// comparing again. The plan is trusted as given; `serialized` must be
    /// the record it was computed for.
    pub fn apply_update(
        &self,
        serialized: &Record,
        plan: UpdatePlan,
    ) -> EvalResult<Option<Record>> {
        match plan {
            UpdatePlan::InSync => Ok(None),
            UpdatePlan::Overwrite(_) => {
                let materialized = self.materializer.deserialize(serialized, OVERWRITE_CHILDREN)?;
                self.observer.on_updated(serialized, &materialized);
                Ok(Some(materialized))
            }
        }
    }

    // -----------------------------------------------------------------------
    // Planning (no side effects)
    // -----------------------------------------------------------------------

    /// Decide what [`Self::evaluate_update`] would do, without doing it.
    ///
    /// Validates both records and runs the comparison once.
    pub fn decide_update(&self, serialized: &Record, live: &Record) -> EvalResult<UpdatePlan> {
        serialized.validate()?;
        live.validate()?;

        match self.comparator.compare(serialized, live) {
            Comparison::Equal => Ok(UpdatePlan::InSync),
            Comparison::Different(mismatch) => {
                debug!(id = %serialized.id, %mismatch, "serialized record is authoritative");
                Ok(UpdatePlan::Overwrite(mismatch))
            }
        }
    }

    /// Decide what [`Self::evaluate_new_serialized_item`] would do.
    pub fn decide_new_serialized_item(&self, serialized: &Record) -> EvalResult<Decision> {
        serialized.validate()?;
        Ok(Decision::Deserialize {
            target: serialized.clone(),
            reason: None,
        })
    }

    /// Decide what [`Self::evaluate_orphans`] would do.
    pub fn decide_orphans(&self, live: &[Record]) -> Vec<Decision> {
        live.iter().cloned().map(Decision::Recycle).collect()
    }
}

impl std::fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Evaluator")
            .field("comparator", &self.comparator)
            .finish_non_exhaustive()
    }
}
