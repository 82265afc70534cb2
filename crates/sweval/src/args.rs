//! CLI argument parsing using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Grade model-generated patches against benchmark gold expectations.
#[derive(Parser, Debug, Clone)]
#[command(name = "sweval")]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Show verbose output (skipped runs, unmatched instances)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build the per-repository funnel report and write the final JSON summary
    Report(ReportArgs),
    /// Print corpus-level weighted/unweighted scores and resolution rates
    Summary(SummaryArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct ReportArgs {
    /// Path to the predictions file (JSON array or JSONL)
    #[arg(long)]
    pub predictions: PathBuf,

    /// Path to the task reference file (JSON array)
    #[arg(long = "tasks")]
    pub task_file: PathBuf,

    /// Directory of evaluation logs (the model's logs live in a subdirectory)
    #[arg(long)]
    pub logs: PathBuf,

    /// Model name used for evaluation
    #[arg(long)]
    pub model: String,

    /// Output path for the final JSON report
    #[arg(long)]
    pub out: PathBuf,
}

#[derive(clap::Args, Debug, Clone)]
pub struct SummaryArgs {
    /// Path to the predictions file (JSON array or JSONL)
    #[arg(long)]
    pub predictions: PathBuf,

    /// Path to the task reference file (JSON array)
    #[arg(long = "tasks")]
    pub task_file: PathBuf,

    /// Directory of evaluation logs for the model
    #[arg(long)]
    pub logs: PathBuf,

    /// Limit the summary to instances whose identifier contains this repo
    #[arg(long)]
    pub repo: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_args_parse() {
        let args = Args::parse_from([
            "sweval", "report", "--predictions", "preds.jsonl", "--tasks", "tasks.json", "--logs",
            "logs", "--model", "gpt-4", "--out", "report.json",
        ]);
        let Command::Report(report) = args.command else {
            panic!("expected report subcommand");
        };
        assert_eq!(report.model, "gpt-4");
        assert_eq!(report.out, PathBuf::from("report.json"));
        assert!(!args.verbose);
    }

    #[test]
    fn test_summary_args_parse() {
        let args = Args::parse_from([
            "sweval", "summary", "--predictions", "preds.jsonl", "--tasks", "tasks.json",
            "--logs", "logs/gpt-4", "--repo", "django", "-v",
        ]);
        let Command::Summary(summary) = args.command else {
            panic!("expected summary subcommand");
        };
        assert_eq!(summary.repo.as_deref(), Some("django"));
        assert!(args.verbose);
    }
}
