//! Top-level model report: per-prediction funnel classification and the
//! final JSON summary.
//!
//! Every prediction is classified into exactly one furthest-reached
//! funnel stage, short-circuiting at the first unmet condition:
//! no patch -> `none`; patch -> `generated`; evaluation log on disk ->
//! `with_logs`; patch applied and tests ran -> `applied`; fully resolved
//! -> `resolved`. Each stage list is a superset of the next for a given
//! repository.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::classify::classify;
use crate::error::Result;
use crate::loader::{load_predictions, load_task_references};
use crate::logparse::LogParser;
use crate::metrics::resolution_status;
use crate::types::{repo_key, EvalRun, ReportMap, ResolutionStatus};

/// Build the per-repository funnel map for one model's predictions.
///
/// Evaluation logs are expected at `{log_dir}/{instance_id}.{model}.eval.log`;
/// a missing log or an instance with no task reference is a soft skip, the
/// prediction simply stops at its last reached stage.
pub fn model_report<P: LogParser>(
    parser: &P,
    model: &str,
    predictions_path: &Path,
    tasks_path: &Path,
    log_dir: &Path,
) -> Result<ReportMap> {
    let references = load_task_references(tasks_path)?;
    let predictions = load_predictions(predictions_path)?;

    info!("building report for {} predictions of {model}", predictions.len());

    let mut report_map = ReportMap::new();
    for prediction in &predictions {
        let funnel = report_map.entry(repo_key(&prediction.instance_id)).or_default();
        let instance_id = prediction.instance_id.clone();

        if prediction.model_patch.is_none() {
            funnel.none.push(instance_id);
            continue;
        }
        funnel.generated.push(instance_id.clone());

        let log_path = log_dir.join(format!("{instance_id}.{model}.eval.log"));
        if !log_path.is_file() {
            debug!("no evaluation log for {instance_id}");
            continue;
        }
        funnel.with_logs.push(instance_id.clone());

        let statuses = match parser.parse(&log_path)? {
            EvalRun::PatchApplyFailed => continue,
            EvalRun::Completed(statuses) => statuses,
        };
        funnel.applied.push(instance_id.clone());

        let Some(gold) = references.get(&instance_id) else {
            debug!("gold results not found for {instance_id}");
            continue;
        };
        let report = classify(&statuses, gold, false);
        if resolution_status(&report) == ResolutionStatus::Full {
            funnel.resolved.push(instance_id);
        }
    }

    Ok(report_map)
}

/// Funnel totals summed over all repositories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunnelStats {
    pub generated: usize,
    pub with_logs: usize,
    pub applied: usize,
    pub resolved: usize,
}

/// Final persisted report for one model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalReport {
    /// Global funnel counts
    pub stats: FunnelStats,
    /// All resolved instance identifiers, in repository order
    pub resolved: Vec<String>,
    /// Resolved instance identifiers per repository
    pub resolved_per_project: BTreeMap<String, Vec<String>>,
}

/// Fold a funnel map into the final report.
pub fn final_report(report_map: &ReportMap) -> FinalReport {
    let mut stats = FunnelStats::default();
    let mut resolved = Vec::new();
    let mut resolved_per_project = BTreeMap::new();

    for (project, funnel) in report_map {
        stats.generated += funnel.generated.len();
        stats.with_logs += funnel.with_logs.len();
        stats.applied += funnel.applied.len();
        stats.resolved += funnel.resolved.len();

        resolved.extend(funnel.resolved.iter().cloned());
        resolved_per_project.insert(project.clone(), funnel.resolved.clone());
    }

    FinalReport {
        stats,
        resolved,
        resolved_per_project,
    }
}

/// Serialize the final report to a JSON file.
pub fn write_final_report(report: &FinalReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    info!("wrote final report to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RepoFunnel;

    #[test]
    fn test_final_report_sums_funnels() {
        let mut report_map = ReportMap::new();
        report_map.insert(
            "a/b".to_string(),
            RepoFunnel {
                none: vec!["a__b-3".to_string()],
                generated: vec!["a__b-1".to_string(), "a__b-2".to_string()],
                with_logs: vec!["a__b-1".to_string(), "a__b-2".to_string()],
                applied: vec!["a__b-1".to_string()],
                resolved: vec!["a__b-1".to_string()],
            },
        );
        report_map.insert(
            "x/y".to_string(),
            RepoFunnel {
                generated: vec!["x__y-1".to_string()],
                ..RepoFunnel::default()
            },
        );

        let report = final_report(&report_map);
        assert_eq!(
            report.stats,
            FunnelStats {
                generated: 3,
                with_logs: 2,
                applied: 1,
                resolved: 1
            }
        );
        assert_eq!(report.resolved, vec!["a__b-1"]);
        assert_eq!(report.resolved_per_project["a/b"], vec!["a__b-1"]);
        assert!(report.resolved_per_project["x/y"].is_empty());
    }

    #[test]
    fn test_final_report_wire_format() {
        let report = final_report(&ReportMap::new());
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"stats\""));
        assert!(json.contains("\"resolved\""));
        assert!(json.contains("\"resolved_per_project\""));
    }
}
