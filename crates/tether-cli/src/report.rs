use colored::Colorize;
use serde::Serialize;
use tether_eval::{DecisionTag, SyncSummary};
use tether_types::{Record, RecordId};

/// One line of an evaluation report.
#[derive(Clone, Debug, Serialize)]
pub struct ReportEntry {
    pub tag: DecisionTag,
    pub id: RecordId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReportEntry {
    pub fn new(tag: DecisionTag, record: &Record) -> Self {
        Self {
            tag,
            id: record.id,
            name: record.name.clone(),
            reason: None,
            error: None,
        }
    }

    pub fn with_reason(mut self, reason: impl ToString) -> Self {
        self.reason = Some(reason.to_string());
        self
    }

    pub fn failed(mut self, error: impl ToString) -> Self {
        self.error = Some(error.to_string());
        self
    }
}

/// Everything `tether evaluate` did (or would do).
#[derive(Clone, Debug, Default, Serialize)]
pub struct Report {
    pub dry_run: bool,
    pub entries: Vec<ReportEntry>,
    pub summary: SyncSummary,
}

impl Report {
    pub fn failures(&self) -> usize {
        self.entries.iter().filter(|e| e.error.is_some()).count()
    }

    pub fn print_text(&self, verbose: bool) {
        for entry in &self.entries {
            if entry.tag == DecisionTag::Unchanged && !verbose {
                continue;
            }
            let tag = match entry.tag {
                DecisionTag::Added => entry.tag.to_string().green().bold(),
                DecisionTag::Updated => entry.tag.to_string().yellow().bold(),
                DecisionTag::Deleted => entry.tag.to_string().red().bold(),
                DecisionTag::Unchanged => entry.tag.to_string().dimmed(),
            };
            print!("[{tag}] {} {}", entry.name.bold(), entry.id.to_string().dimmed());
            if let Some(reason) = &entry.reason {
                print!("  ({reason})");
            }
            if let Some(error) = &entry.error {
                print!("  {} {error}", "failed:".red());
            }
            println!();
        }

        let prefix = if self.dry_run { "Would sync" } else { "Synced" };
        if self.summary.is_clean() && self.failures() == 0 {
            println!("{} {prefix}: everything up to date.", "✓".green().bold());
        } else {
            println!("{prefix}: {}", self.summary);
        }
        if self.failures() > 0 {
            println!("{} {} record(s) failed", "✗".red().bold(), self.failures());
        }
    }

    pub fn print_json(&self) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(self)?);
        Ok(())
    }
}
