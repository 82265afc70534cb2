//! Evaluation-log parsing.
//!
//! The report pipeline is deliberately ignorant of raw log text; all it
//! needs per run is a status map plus whether the patch applied at all.
//! [`LogParser`] captures that contract, and [`HarnessLogParser`] reads
//! the normalized line format the evaluation harness writes. Tests and
//! alternative harnesses can substitute their own implementation.

use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::types::{EvalRun, StatusMap, TestStatus};

/// Marker the harness writes once the patch applied cleanly.
const APPLY_PATCH_PASS: &str = ">>>>> Applied Patch";
/// Marker the harness writes when the patch could not be applied.
const APPLY_PATCH_FAIL: &str = ">>>>> Patch Apply Failed";
/// Markers for runs that died before producing a usable report.
const RUN_ABORT_MARKERS: &[&str] = &[
    ">>>>> Tests Errored",
    ">>>>> Tests Timed Out",
    ">>>>> Failed to reset task environment",
];

/// Contract required from the log-parsing collaborator.
pub trait LogParser {
    /// Parse one evaluation log into an observed run.
    fn parse(&self, log_path: &Path) -> Result<EvalRun>;
}

/// Parser for the harness' normalized evaluation logs.
///
/// Log bodies carry one `STATUS test_identifier` line per test
/// (`PASSED`/`FAILED`/`SKIPPED`/`ERROR`) plus apply markers around the
/// test output.
#[derive(Debug, Clone, Copy, Default)]
pub struct HarnessLogParser;

impl LogParser for HarnessLogParser {
    fn parse(&self, log_path: &Path) -> Result<EvalRun> {
        let content = std::fs::read_to_string(log_path)?;
        let run = parse_log_content(&content);
        if matches!(run, EvalRun::PatchApplyFailed) {
            debug!("no evaluation report in {}", log_path.display());
        }
        Ok(run)
    }
}

/// Parse a log body into an observed run.
///
/// A log with the apply-failure marker, an abort marker, or no apply
/// marker at all yields [`EvalRun::PatchApplyFailed`]: no valid report was
/// found for it.
pub fn parse_log_content(content: &str) -> EvalRun {
    if content.contains(APPLY_PATCH_FAIL)
        || RUN_ABORT_MARKERS.iter().any(|marker| content.contains(marker))
        || !content.contains(APPLY_PATCH_PASS)
    {
        return EvalRun::PatchApplyFailed;
    }

    let mut statuses = StatusMap::new();
    for line in content.lines() {
        let Some((head, test)) = line.trim().split_once(' ') else {
            continue;
        };
        let status = match head {
            "PASSED" => TestStatus::Passed,
            "FAILED" => TestStatus::Failed,
            "SKIPPED" => TestStatus::Skipped,
            "ERROR" => TestStatus::Error,
            _ => continue,
        };
        statuses.insert(test.trim().to_string(), status);
    }

    EvalRun::Completed(statuses)
}

/// Stable run name for a log path: the file name minus its extension.
pub fn run_name(log_path: &Path) -> String {
    log_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Instance identifier encoded in a log path.
///
/// Logs are named `{instance_id}.{model}.eval.log`, so the identifier is
/// the file name up to the first `.`.
pub fn instance_id_from_path(log_path: &Path) -> String {
    let name = log_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.split_once('.') {
        Some((id, _)) => id.to_string(),
        None => name,
    }
}
