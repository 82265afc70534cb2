//! Pure metric functions over categorized instance reports.
//!
//! Weighted ratios pool every test across the input reports, so a task
//! with ten fail-to-pass tests contributes ten data points. Unweighted
//! ratios average the per-instance ratios, so every task counts equally.
//! Every ratio is defined as 0.0 when its denominator is 0; callers never
//! see a division error on empty input.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::{CategoryOutcome, InstanceReport, ResolutionStatus};

fn ratio(success: usize, failure: usize) -> f64 {
    let total = success + failure;
    if total == 0 {
        0.0
    } else {
        success as f64 / total as f64
    }
}

fn weighted(reports: &[&InstanceReport], category: fn(&InstanceReport) -> &CategoryOutcome) -> f64 {
    let success: usize = reports.iter().map(|r| category(r).success.len()).sum();
    let failure: usize = reports.iter().map(|r| category(r).failure.len()).sum();
    ratio(success, failure)
}

fn unweighted(
    reports: &[&InstanceReport],
    category: fn(&InstanceReport) -> &CategoryOutcome,
) -> f64 {
    if reports.is_empty() {
        return 0.0;
    }
    let sum: f64 = reports
        .iter()
        .map(|r| {
            let outcome = category(r);
            ratio(outcome.success.len(), outcome.failure.len())
        })
        .sum();
    sum / reports.len() as f64
}

/// Fail-to-pass ratio weighted by test count.
pub fn fail_to_pass_weighted(reports: &[&InstanceReport]) -> f64 {
    weighted(reports, |r| &r.fail_to_pass)
}

/// Pass-to-pass ratio weighted by test count.
pub fn pass_to_pass_weighted(reports: &[&InstanceReport]) -> f64 {
    weighted(reports, |r| &r.pass_to_pass)
}

/// Mean of per-instance fail-to-pass ratios.
pub fn fail_to_pass_unweighted(reports: &[&InstanceReport]) -> f64 {
    unweighted(reports, |r| &r.fail_to_pass)
}

/// Mean of per-instance pass-to-pass ratios.
pub fn pass_to_pass_unweighted(reports: &[&InstanceReport]) -> f64 {
    unweighted(reports, |r| &r.pass_to_pass)
}

/// Convert a ratio to a percentage rounded to two decimals.
pub fn percent(ratio: f64) -> f64 {
    (ratio * 10_000.0).round() / 100.0
}

/// Grade one report into a resolution verdict.
///
/// Total over every combination of zero/nonzero success and failure
/// counts:
/// - `Full` iff fail-to-pass and pass-to-pass both have zero failures
///   (empty gold sets therefore grade as resolved);
/// - otherwise `Partial` iff fail-to-pass has at least one success;
/// - otherwise `No`.
pub fn resolution_status(report: &InstanceReport) -> ResolutionStatus {
    if report.fail_to_pass.failure.is_empty() && report.pass_to_pass.failure.is_empty() {
        ResolutionStatus::Full
    } else if !report.fail_to_pass.success.is_empty() {
        ResolutionStatus::Partial
    } else {
        ResolutionStatus::No
    }
}

/// Distribution of resolution verdicts across a report sequence.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolutionHistogram {
    /// Number of reports per verdict; sums to the number of inputs
    pub counts: BTreeMap<String, usize>,
    /// Percentage of reports per verdict, rounded to two decimals
    pub rates: BTreeMap<String, f64>,
}

/// Count resolution verdicts and their percentage rates.
pub fn resolution_histogram(reports: &[&InstanceReport]) -> ResolutionHistogram {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for report in reports {
        *counts
            .entry(resolution_status(report).as_str().to_string())
            .or_insert(0) += 1;
    }

    let total = reports.len();
    let rates = counts
        .iter()
        .map(|(status, count)| {
            let rate = if total == 0 {
                0.0
            } else {
                percent(*count as f64 / total as f64)
            };
            (status.clone(), rate)
        })
        .collect();

    ResolutionHistogram { counts, rates }
}
