//! Eval report generation over sets of evaluation logs.
//!
//! The log-set reporter matches each observed run to its gold expectation
//! and partitions the resulting reports into patch-apply successes and
//! failures. The model summary builder folds those reports into
//! corpus-level weighted/unweighted scores and a resolution histogram.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::classify::{all_failures, classify};
use crate::error::{ReportError, Result};
use crate::loader::{load_predictions, load_task_references};
use crate::logparse::{instance_id_from_path, run_name, LogParser};
use crate::metrics::{
    fail_to_pass_unweighted, fail_to_pass_weighted, pass_to_pass_unweighted, pass_to_pass_weighted,
    percent, resolution_histogram,
};
use crate::types::{EvalRun, InstanceReport, TaskReference};

/// Reports keyed by run name (log file name minus extension).
pub type ReportsByRun = BTreeMap<String, InstanceReport>;

/// Predicate deciding whether a log path participates in a report.
pub type LogFilter<'a> = &'a dyn Fn(&Path) -> bool;

/// Build categorized reports for a list of evaluation logs.
///
/// Runs failing the filter are discarded up front. Runs whose instance
/// identifier has no matching task reference are skipped and appear in
/// neither map. Every remaining run lands in exactly one map: completed
/// runs classify into the success map, patch-apply failures synthesize an
/// all-failure report into the failure map.
pub fn reports_for_logs<P: LogParser>(
    parser: &P,
    log_paths: &[PathBuf],
    references: &HashMap<String, TaskReference>,
    filter: Option<LogFilter<'_>>,
) -> Result<(ReportsByRun, ReportsByRun)> {
    let mut patch_success = ReportsByRun::new();
    let mut patch_failure = ReportsByRun::new();

    for log_path in log_paths {
        if let Some(filter) = filter {
            if !filter(log_path) {
                continue;
            }
        }

        let instance_id = instance_id_from_path(log_path);
        let Some(gold) = references.get(&instance_id) else {
            debug!("gold results not found for {instance_id}, skipping {}", log_path.display());
            continue;
        };

        match parser.parse(log_path)? {
            EvalRun::PatchApplyFailed => {
                patch_failure.insert(run_name(log_path), all_failures(gold));
            }
            EvalRun::Completed(statuses) => {
                patch_success.insert(run_name(log_path), classify(&statuses, gold, false));
            }
        }
    }

    Ok((patch_success, patch_failure))
}

/// Build categorized reports for every `*.log` file in a directory.
///
/// A missing directory is a configuration error, not a soft skip.
pub fn reports_for_dir<P: LogParser>(
    parser: &P,
    eval_dir: &Path,
    references: &HashMap<String, TaskReference>,
    filter: Option<LogFilter<'_>>,
) -> Result<(ReportsByRun, ReportsByRun)> {
    if !eval_dir.is_dir() {
        return Err(ReportError::MissingInput(eval_dir.to_path_buf()));
    }

    let pattern = eval_dir.join("*.log");
    let mut log_paths: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())?
        .filter_map(|entry| entry.ok())
        .collect();
    log_paths.sort();

    debug!("found {} evaluation logs in {}", log_paths.len(), eval_dir.display());
    reports_for_logs(parser, &log_paths, references, filter)
}

/// Scores for one patch-apply granularity of a model summary.
#[derive(Debug, Clone, Serialize)]
pub struct GranularitySummary {
    /// Fail-to-pass percentage weighted by test count
    pub f2p_weighted: f64,
    /// Pass-to-pass percentage weighted by test count
    pub p2p_weighted: f64,
    /// Mean of per-instance fail-to-pass percentages
    pub f2p_unweighted: f64,
    /// Mean of per-instance pass-to-pass percentages
    pub p2p_unweighted: f64,
    /// Raw report maps that produced these scores, for traceability
    pub cases: Vec<ReportsByRun>,
    /// Number of reports per resolution verdict
    pub case_resolution_counts: BTreeMap<String, usize>,
    /// Percentage of reports per resolution verdict
    pub case_resolution_rates: BTreeMap<String, f64>,
}

impl GranularitySummary {
    fn from_report_maps(maps: Vec<ReportsByRun>) -> Self {
        let flattened: Vec<&InstanceReport> =
            maps.iter().flat_map(|reports| reports.values()).collect();
        let histogram = resolution_histogram(&flattened);

        Self {
            f2p_weighted: percent(fail_to_pass_weighted(&flattened)),
            p2p_weighted: percent(pass_to_pass_weighted(&flattened)),
            f2p_unweighted: percent(fail_to_pass_unweighted(&flattened)),
            p2p_unweighted: percent(pass_to_pass_unweighted(&flattened)),
            cases: maps,
            case_resolution_counts: histogram.counts,
            case_resolution_rates: histogram.rates,
        }
    }
}

/// Summary of a model's evaluation results over a prediction corpus.
#[derive(Debug, Clone, Serialize)]
pub struct ModelSummary {
    /// Repository the summary was limited to, or "all"
    pub repo: String,
    /// Number of predictions after filtering
    pub total_predictions: usize,
    /// Scores over runs whose patch applied
    #[serde(rename = "Patch Apply Success")]
    pub patch_apply_success: GranularitySummary,
    /// Scores over all runs, counting apply failures as all-failure reports
    #[serde(rename = "Patch Apply Success + Failure")]
    pub patch_apply_success_and_failure: GranularitySummary,
}

/// Generate a summary of model evaluation results.
///
/// When `repo` is given, the same substring test against the instance
/// identifier filters both the predictions and the evaluation logs, so
/// the two stay consistent.
pub fn model_eval_summary<P: LogParser>(
    parser: &P,
    predictions_path: &Path,
    eval_dir: &Path,
    tasks_path: &Path,
    repo: Option<&str>,
) -> Result<ModelSummary> {
    let mut predictions = load_predictions(predictions_path)?;
    if let Some(repo) = repo {
        predictions.retain(|prediction| prediction.instance_id.contains(repo));
    }

    let references = load_task_references(tasks_path)?;

    let log_filter = repo.map(|repo| {
        move |log_path: &Path| instance_id_from_path(log_path).contains(repo)
    });
    let (patch_success, patch_failure) = reports_for_dir(
        parser,
        eval_dir,
        &references,
        log_filter.as_ref().map(|f| f as LogFilter<'_>),
    )?;

    info!(
        "summarizing {} applied and {} unapplied runs",
        patch_success.len(),
        patch_failure.len()
    );

    Ok(ModelSummary {
        repo: repo.unwrap_or("all").to_string(),
        total_predictions: predictions.len(),
        patch_apply_success: GranularitySummary::from_report_maps(vec![patch_success.clone()]),
        patch_apply_success_and_failure: GranularitySummary::from_report_maps(vec![
            patch_success,
            patch_failure,
        ]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logparse::HarnessLogParser;
    use crate::metrics::resolution_status;
    use crate::types::ResolutionStatus;
    use std::io::Write;

    fn reference(instance_id: &str, f2p: &[&str], p2p: &[&str]) -> TaskReference {
        TaskReference {
            instance_id: instance_id.to_string(),
            fail_to_pass: f2p.iter().map(|t| t.to_string()).collect(),
            pass_to_pass: p2p.iter().map(|t| t.to_string()).collect(),
            fail_to_fail: vec![],
            pass_to_fail: vec![],
        }
    }

    fn write_log(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_reports_partition_by_patch_status() {
        let dir = tempfile::tempdir().unwrap();
        let references: HashMap<String, TaskReference> = [
            ("a__b-1".to_string(), reference("a__b-1", &["t1", "t2"], &["t3"])),
            ("a__b-2".to_string(), reference("a__b-2", &["t1"], &[])),
        ]
        .into_iter()
        .collect();

        let applied = write_log(
            dir.path(),
            "a__b-1.model.eval.log",
            ">>>>> Applied Patch (pred)\nPASSED t1\nFAILED t2\nPASSED t3\n",
        );
        let unapplied = write_log(dir.path(), "a__b-2.model.eval.log", ">>>>> Patch Apply Failed\n");
        // No task reference for this one; it must appear in neither map.
        let unmatched = write_log(
            dir.path(),
            "c__d-9.model.eval.log",
            ">>>>> Applied Patch (pred)\nPASSED t1\n",
        );

        let (success, failure) = reports_for_logs(
            &HarnessLogParser,
            &[applied, unapplied, unmatched],
            &references,
            None,
        )
        .unwrap();

        assert_eq!(success.len(), 1);
        assert_eq!(failure.len(), 1);

        let report = &success["a__b-1.model.eval"];
        assert_eq!(report.fail_to_pass.success, vec!["t1"]);
        assert_eq!(report.fail_to_pass.failure, vec!["t2"]);
        assert_eq!(report.pass_to_pass.success, vec!["t3"]);
        assert_eq!(resolution_status(report), ResolutionStatus::Partial);

        let report = &failure["a__b-2.model.eval"];
        assert!(report.fail_to_pass.success.is_empty());
        assert_eq!(report.fail_to_pass.failure, vec!["t1"]);
        assert_eq!(resolution_status(report), ResolutionStatus::No);
    }

    #[test]
    fn test_filter_discards_runs() {
        let dir = tempfile::tempdir().unwrap();
        let references: HashMap<String, TaskReference> = [(
            "a__b-1".to_string(),
            reference("a__b-1", &["t1"], &[]),
        )]
        .into_iter()
        .collect();

        let log = write_log(
            dir.path(),
            "a__b-1.model.eval.log",
            ">>>>> Applied Patch (pred)\nPASSED t1\n",
        );

        let reject_all = |_: &Path| false;
        let (success, failure) = reports_for_logs(
            &HarnessLogParser,
            std::slice::from_ref(&log),
            &references,
            Some(&reject_all),
        )
        .unwrap();
        assert!(success.is_empty());
        assert!(failure.is_empty());
    }

    #[test]
    fn test_reports_for_missing_dir_fails_fast() {
        let references = HashMap::new();
        let err = reports_for_dir(
            &HarnessLogParser,
            Path::new("/nonexistent/logs"),
            &references,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ReportError::MissingInput(_)));
    }

    #[test]
    fn test_model_eval_summary_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");
        std::fs::create_dir(&log_dir).unwrap();

        let tasks_path = dir.path().join("tasks.json");
        std::fs::write(
            &tasks_path,
            r#"[
                {"instance_id": "a__b-1", "FAIL_TO_PASS": ["t1"], "PASS_TO_PASS": ["t2"]},
                {"instance_id": "a__b-2", "FAIL_TO_PASS": ["t1"], "PASS_TO_PASS": []}
            ]"#,
        )
        .unwrap();

        let predictions_path = dir.path().join("preds.jsonl");
        let mut predictions = std::fs::File::create(&predictions_path).unwrap();
        writeln!(predictions, r#"{{"instance_id": "a__b-1", "model_patch": "diff"}}"#).unwrap();
        writeln!(predictions, r#"{{"instance_id": "a__b-2", "model_patch": "diff"}}"#).unwrap();

        write_log(
            &log_dir,
            "a__b-1.model.eval.log",
            ">>>>> Applied Patch (pred)\nPASSED t1\nPASSED t2\n",
        );
        write_log(&log_dir, "a__b-2.model.eval.log", ">>>>> Patch Apply Failed\n");

        let summary = model_eval_summary(
            &HarnessLogParser,
            &predictions_path,
            &log_dir,
            &tasks_path,
            None,
        )
        .unwrap();

        assert_eq!(summary.repo, "all");
        assert_eq!(summary.total_predictions, 2);

        // Success-only granularity sees one perfect run.
        assert_eq!(summary.patch_apply_success.f2p_weighted, 100.0);
        assert_eq!(summary.patch_apply_success.case_resolution_counts["RESOLVED_FULL"], 1);

        // Combined granularity pools the apply failure in as all-failure.
        let combined = &summary.patch_apply_success_and_failure;
        assert_eq!(combined.f2p_weighted, 50.0);
        assert_eq!(combined.case_resolution_counts["RESOLVED_NO"], 1);
        assert_eq!(combined.case_resolution_counts.values().sum::<usize>(), 2);
        assert_eq!(combined.cases.len(), 2);
    }

    #[test]
    fn test_repo_filter_applies_to_predictions_and_logs() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");
        std::fs::create_dir(&log_dir).unwrap();

        let tasks_path = dir.path().join("tasks.json");
        std::fs::write(
            &tasks_path,
            r#"[
                {"instance_id": "a__b-1", "FAIL_TO_PASS": ["t1"], "PASS_TO_PASS": []},
                {"instance_id": "x__y-1", "FAIL_TO_PASS": ["t1"], "PASS_TO_PASS": []}
            ]"#,
        )
        .unwrap();

        let predictions_path = dir.path().join("preds.jsonl");
        let mut predictions = std::fs::File::create(&predictions_path).unwrap();
        writeln!(predictions, r#"{{"instance_id": "a__b-1", "model_patch": "diff"}}"#).unwrap();
        writeln!(predictions, r#"{{"instance_id": "x__y-1", "model_patch": "diff"}}"#).unwrap();

        write_log(
            &log_dir,
            "a__b-1.model.eval.log",
            ">>>>> Applied Patch (pred)\nPASSED t1\n",
        );
        write_log(
            &log_dir,
            "x__y-1.model.eval.log",
            ">>>>> Applied Patch (pred)\nPASSED t1\n",
        );

        let summary = model_eval_summary(
            &HarnessLogParser,
            &predictions_path,
            &log_dir,
            &tasks_path,
            Some("a__b"),
        )
        .unwrap();

        assert_eq!(summary.repo, "a__b");
        assert_eq!(summary.total_predictions, 1);
        assert_eq!(summary.patch_apply_success.cases[0].len(), 1);
    }
}
