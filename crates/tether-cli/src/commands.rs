use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use serde_json::json;
use tether_eval::{
    DecisionTag, EvalResult, Evaluator, EvaluatorConfig, SyncSummary, TracingObserver,
};
use tether_store::InMemoryLiveStore;
use tether_types::{Record, RecordId};
use tracing::{info, warn};

use crate::cli::*;
use crate::report::{Report, ReportEntry};

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Evaluate(args) => cmd_evaluate(args, cli.format, cli.verbose),
        Command::Compare(args) => cmd_compare(args, cli.format),
    }
}

fn cmd_evaluate(args: EvaluateArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let report = evaluate(&args)?;
    match format {
        OutputFormat::Text => report.print_text(verbose),
        OutputFormat::Json => report.print_json()?,
    }
    if report.failures() > 0 {
        anyhow::bail!("{} record(s) failed to sync", report.failures());
    }
    Ok(())
}

fn cmd_compare(args: CompareArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let serialized = load_record(&args.serialized)?;
    let live = load_record(&args.live)?;
    serialized
        .validate()
        .with_context(|| format!("invalid record in {}", args.serialized.display()))?;
    live.validate()
        .with_context(|| format!("invalid record in {}", args.live.display()))?;

    let comparison = config.comparator().compare(&serialized, &live);
    match format {
        OutputFormat::Json => {
            let out = json!({
                "equal": comparison.is_equal(),
                "mismatch": comparison.mismatch().map(|m| m.to_string()),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => match comparison.mismatch() {
            None => println!("{} {} is in sync", "✓".green().bold(), serialized.name.bold()),
            Some(mismatch) => println!(
                "{} {} differs: {mismatch}",
                "✗".red().bold(),
                serialized.name.bold()
            ),
        },
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Evaluation pass
// ---------------------------------------------------------------------------

/// Serialized and live records sorted into the three evaluator inputs.
#[derive(Debug, Default)]
pub struct Classified {
    /// Serialized only, in serialized order.
    pub new: Vec<Record>,
    /// Live only, in live order.
    pub orphans: Vec<Record>,
    /// Present on both sides, in serialized order.
    pub pairs: Vec<(Record, Record)>,
}

/// Match records across both sets by id.
pub fn classify(serialized: Vec<Record>, live: Vec<Record>) -> Classified {
    let serialized_ids: HashSet<RecordId> = serialized.iter().map(|r| r.id).collect();
    let mut matched: HashMap<RecordId, Record> = HashMap::new();
    let mut classified = Classified::default();

    for record in live {
        if serialized_ids.contains(&record.id) {
            matched.insert(record.id, record);
        } else {
            classified.orphans.push(record);
        }
    }
    for record in serialized {
        match matched.remove(&record.id) {
            Some(live) => classified.pairs.push((record, live)),
            None => classified.new.push(record),
        }
    }
    classified
}

/// Orphans split by how they leave the live store.
#[derive(Debug, Default, PartialEq)]
pub struct OrphanPlan {
    /// Orphans with no orphaned ancestor, in live order. Recycled directly.
    pub topmost: Vec<Record>,
    /// Orphans removed by recycling an orphaned ancestor, paired with the
    /// topmost orphan that carries them.
    pub nested: Vec<(Record, RecordId)>,
}

/// Split orphans into those recycled directly and those the store removes
/// along with an orphaned ancestor.
pub fn plan_orphans(orphans: &[Record]) -> OrphanPlan {
    let parents: HashMap<RecordId, Option<RecordId>> =
        orphans.iter().map(|r| (r.id, r.parent)).collect();
    let mut plan = OrphanPlan::default();

    for orphan in orphans {
        let root = orphan_root(orphan.id, &parents);
        if root == orphan.id {
            plan.topmost.push(orphan.clone());
        } else {
            plan.nested.push((orphan.clone(), root));
        }
    }
    plan
}

/// Walk up through orphaned parents. A parent cycle ends the walk at the
/// starting record, which is then recycled on its own.
fn orphan_root(id: RecordId, parents: &HashMap<RecordId, Option<RecordId>>) -> RecordId {
    let mut root = id;
    let mut seen = HashSet::new();
    while let Some(&Some(parent)) = parents.get(&root) {
        if !parents.contains_key(&parent) || !seen.insert(root) {
            break;
        }
        root = parent;
    }
    if seen.contains(&root) {
        id
    } else {
        root
    }
}

/// Run (or plan) a full evaluation pass and collect the outcome.
///
/// Each record is evaluated on its own; a failure is reported against that
/// record and the pass moves on.
pub fn evaluate(args: &EvaluateArgs) -> anyhow::Result<Report> {
    let config = load_config(args.config.as_deref())?;
    let serialized = load_records(&args.serialized)?;
    let live = load_records(&args.live)?;
    let store = Arc::new(InMemoryLiveStore::with_records(live.iter().cloned()));
    let evaluator = Evaluator::with_store(store, Arc::new(TracingObserver), &config);

    let classified = classify(serialized, live);
    info!(
        pairs = classified.pairs.len(),
        new = classified.new.len(),
        orphans = classified.orphans.len(),
        dry_run = args.dry_run,
        "evaluating"
    );

    let mut report = Report {
        dry_run: args.dry_run,
        ..Default::default()
    };

    for (serialized, live) in &classified.pairs {
        let entry = update_entry(&evaluator, serialized, live, args.dry_run, &mut report.summary);
        report.entries.push(entry);
    }

    for serialized in &classified.new {
        let entry = ReportEntry::new(DecisionTag::Added, serialized);
        let outcome = if args.dry_run {
            evaluator.decide_new_serialized_item(serialized).map(|_| ())
        } else {
            evaluator.evaluate_new_serialized_item(serialized).map(|_| ())
        };
        report.entries.push(settle(outcome, entry, &mut report.summary, SyncSummary::record_created));
    }

    let orphans = plan_orphans(&classified.orphans);
    let mut removed: HashSet<RecordId> = HashSet::new();
    if args.dry_run {
        for decision in evaluator.decide_orphans(&orphans.topmost) {
            if let Some(record) = decision.record() {
                report.entries.push(ReportEntry::new(decision.tag(), record));
                removed.insert(record.id);
            }
            report.summary.record_decision(&decision);
        }
    } else {
        for orphan in &orphans.topmost {
            let entry = ReportEntry::new(DecisionTag::Deleted, orphan);
            let outcome = evaluator.evaluate_orphans(std::slice::from_ref(orphan));
            if outcome.is_ok() {
                removed.insert(orphan.id);
            }
            report.entries.push(settle(outcome, entry, &mut report.summary, |s| {
                s.record_recycled(1)
            }));
        }
    }

    for (orphan, root) in &orphans.nested {
        let entry = ReportEntry::new(DecisionTag::Deleted, orphan)
            .with_reason(format!("removed with parent {}", root.short_id()));
        if removed.contains(root) {
            report.summary.record_tag(DecisionTag::Deleted);
            report.entries.push(entry);
        } else {
            warn!(id = %orphan.id, parent = %root, "orphan kept, parent was not recycled");
            report.entries.push(entry.failed("parent was not recycled"));
        }
    }

    Ok(report)
}

fn update_entry(
    evaluator: &Evaluator,
    serialized: &Record,
    live: &Record,
    dry_run: bool,
    summary: &mut SyncSummary,
) -> ReportEntry {
    let plan = match evaluator.decide_update(serialized, live) {
        Ok(plan) => plan,
        Err(e) => {
            warn!(id = %serialized.id, error = %e, "update evaluation failed");
            return ReportEntry::new(DecisionTag::Updated, serialized).failed(e);
        }
    };

    let mut entry = ReportEntry::new(plan.tag(), serialized);
    if let Some(reason) = plan.reason() {
        entry = entry.with_reason(reason);
    }

    if dry_run {
        summary.record_tag(plan.tag());
        return entry;
    }

    match evaluator.apply_update(serialized, plan) {
        Ok(outcome) => {
            summary.record_update(outcome.as_ref());
            entry
        }
        Err(e) => {
            warn!(id = %serialized.id, error = %e, "update failed");
            entry.failed(e)
        }
    }
}

fn settle(
    outcome: EvalResult<()>,
    entry: ReportEntry,
    summary: &mut SyncSummary,
    count: impl FnOnce(&mut SyncSummary),
) -> ReportEntry {
    match outcome {
        Ok(()) => {
            count(summary);
            entry
        }
        Err(e) => {
            warn!(id = %entry.id, error = %e, "record failed");
            entry.failed(e)
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

fn load_config(path: Option<&Path>) -> anyhow::Result<EvaluatorConfig> {
    match path {
        None => Ok(EvaluatorConfig::default()),
        Some(path) => {
            let src = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            EvaluatorConfig::from_toml_str(&src)
                .with_context(|| format!("parsing config {}", path.display()))
        }
    }
}

fn load_records(path: &Path) -> anyhow::Result<Vec<Record>> {
    let src = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&src).with_context(|| format!("parsing records in {}", path.display()))
}

fn load_record(path: &Path) -> anyhow::Result<Record> {
    let src = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&src).with_context(|| format!("parsing record in {}", path.display()))
}
