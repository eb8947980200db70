use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tether",
    about = "Tether: keep a live content store in step with its serialized tree",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Reconcile a live record set with a serialized record set
    Evaluate(EvaluateArgs),
    /// Compare one serialized record with one live record
    Compare(CompareArgs),
}

#[derive(Args)]
pub struct EvaluateArgs {
    /// JSON array of serialized records
    #[arg(long)]
    pub serialized: PathBuf,
    /// JSON array of live records
    #[arg(long)]
    pub live: PathBuf,
    /// Evaluator configuration (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Report decisions without applying them
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct CompareArgs {
    /// JSON file holding the serialized record
    pub serialized: PathBuf,
    /// JSON file holding the live record
    pub live: PathBuf,
    /// Evaluator configuration (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
