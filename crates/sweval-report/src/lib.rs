//! Resolution reporting for patch-evaluation benchmarks.
//!
//! This crate grades machine-generated code patches against a benchmark
//! of software-repair tasks. For each task instance it reconciles the
//! gold expected test transitions with the status map observed in an
//! evaluation log, classifies every test into success/failure per
//! transition category, and aggregates the classifications into
//! per-instance, per-repository, and corpus-wide resolution metrics.
//!
//! # Pipeline
//!
//! ```text
//! LogParser        - evaluation log -> status map / patch-apply failure
//! classify         - gold expectation x status map -> InstanceReport
//! metrics          - weighted/unweighted ratios, resolution verdicts
//! reports_for_dir  - log set -> (patch success, patch failure) report maps
//! model_eval_summary - corpus-level scores and resolution histogram
//! model_report     - per-prediction funnel and the final JSON report
//! ```
//!
//! The tool never runs tests itself; it consumes predictions, task
//! references, and evaluation logs produced elsewhere.

pub mod classify;
pub mod driver;
pub mod error;
pub mod loader;
pub mod logparse;
pub mod metrics;
pub mod report;
pub mod types;

pub use classify::{all_failures, classify};
pub use driver::{final_report, model_report, write_final_report, FinalReport, FunnelStats};
pub use error::{ReportError, Result};
pub use loader::{load_predictions, load_task_references};
pub use logparse::{parse_log_content, HarnessLogParser, LogParser};
pub use metrics::{
    fail_to_pass_unweighted, fail_to_pass_weighted, pass_to_pass_unweighted, pass_to_pass_weighted,
    resolution_histogram, resolution_status, ResolutionHistogram,
};
pub use report::{
    model_eval_summary, reports_for_dir, reports_for_logs, GranularitySummary, ModelSummary,
    ReportsByRun,
};
pub use types::{
    repo_key, CategoryOutcome, EvalRun, InstanceReport, Prediction, RepoFunnel, ReportMap,
    ResolutionStatus, StatusMap, TaskReference, TestStatus,
};
