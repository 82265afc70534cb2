//! Outcome classification: reconciling a gold expectation with one
//! observed status map.
//!
//! Metric definitions (gold transition + observed result):
//! - Fail-to-Pass + passed: success (resolution)
//! - Pass-to-Pass + passed: success (maintenance)
//! - Fail-to-Pass + failed: failure
//! - Pass-to-Pass + failed: failure
//!
//! Extended categories, off by default:
//! - Fail-to-Fail + passed: success (extra credit)
//! - Pass-to-Fail: tracked but not scored

use crate::types::{CategoryOutcome, InstanceReport, StatusMap, TaskReference, TestStatus};

/// Split one gold category by what the run observed.
///
/// A test that is absent from the status map, skipped, or errored is
/// dropped from both lists rather than counted as a failure. This
/// reproduces the upstream grading convention ("assume silent success is
/// not claimed"); counting absence as failure would change scores and is
/// deliberately not done here.
fn split_category(tests: &[String], statuses: &StatusMap) -> CategoryOutcome {
    let mut outcome = CategoryOutcome::default();
    for test in tests {
        match statuses.get(test) {
            Some(TestStatus::Passed) => outcome.success.push(test.clone()),
            Some(TestStatus::Failed) => outcome.failure.push(test.clone()),
            Some(TestStatus::Skipped) | Some(TestStatus::Error) | None => {}
        }
    }
    outcome
}

/// Classify an observed status map against a gold expectation.
///
/// Each gold test identifier lands in at most one of that category's
/// success/failure lists. With `extended` false (the default mode) the
/// Fail-to-Fail and Pass-to-Fail categories are not processed and come
/// back empty, so those gold sets need not be populated.
///
/// This path assumes the run actually produced a report; a patch that
/// failed to apply never reaches classification (see
/// [`all_failures`]).
pub fn classify(statuses: &StatusMap, gold: &TaskReference, extended: bool) -> InstanceReport {
    let mut report = InstanceReport {
        fail_to_pass: split_category(&gold.fail_to_pass, statuses),
        pass_to_pass: split_category(&gold.pass_to_pass, statuses),
        ..InstanceReport::default()
    };

    if extended {
        report.fail_to_fail = split_category(&gold.fail_to_fail, statuses);
        report.pass_to_fail = split_category(&gold.pass_to_fail, statuses);
    }

    report
}

/// Synthesize the report for a run whose patch failed to apply.
///
/// No test could execute, so by convention every gold test in every
/// category the reference defines is a failure and every success list is
/// empty. Same report shape as [`classify`], distinct code path.
pub fn all_failures(gold: &TaskReference) -> InstanceReport {
    InstanceReport {
        fail_to_pass: CategoryOutcome::all_failures(&gold.fail_to_pass),
        pass_to_pass: CategoryOutcome::all_failures(&gold.pass_to_pass),
        fail_to_fail: CategoryOutcome::all_failures(&gold.fail_to_fail),
        pass_to_fail: CategoryOutcome::all_failures(&gold.pass_to_fail),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gold() -> TaskReference {
        TaskReference {
            instance_id: "django__django-11133".to_string(),
            fail_to_pass: vec!["t1".to_string(), "t2".to_string()],
            pass_to_pass: vec!["t3".to_string()],
            fail_to_fail: vec!["t4".to_string()],
            pass_to_fail: vec![],
        }
    }

    fn statuses(entries: &[(&str, TestStatus)]) -> StatusMap {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_classify_partitions_each_test_once() {
        let sm = statuses(&[
            ("t1", TestStatus::Passed),
            ("t2", TestStatus::Failed),
            ("t3", TestStatus::Passed),
        ]);

        let report = classify(&sm, &gold(), false);
        assert_eq!(report.fail_to_pass.success, vec!["t1"]);
        assert_eq!(report.fail_to_pass.failure, vec!["t2"]);
        assert_eq!(report.pass_to_pass.success, vec!["t3"]);
        assert!(report.pass_to_pass.failure.is_empty());
    }

    #[test]
    fn test_absent_skipped_and_error_are_omitted() {
        // t1 absent, t2 skipped, t3 errored: none of them appear anywhere.
        let sm = statuses(&[("t2", TestStatus::Skipped), ("t3", TestStatus::Error)]);

        let report = classify(&sm, &gold(), false);
        assert!(report.fail_to_pass.success.is_empty());
        assert!(report.fail_to_pass.failure.is_empty());
        assert!(report.pass_to_pass.success.is_empty());
        assert!(report.pass_to_pass.failure.is_empty());
    }

    #[test]
    fn test_extended_categories_skipped_by_default() {
        let sm = statuses(&[("t4", TestStatus::Passed)]);

        let report = classify(&sm, &gold(), false);
        assert!(report.fail_to_fail.success.is_empty());

        let report = classify(&sm, &gold(), true);
        assert_eq!(report.fail_to_fail.success, vec!["t4"]);
    }

    #[test]
    fn test_all_failures_covers_every_gold_test() {
        let report = all_failures(&gold());
        assert!(report.fail_to_pass.success.is_empty());
        assert_eq!(report.fail_to_pass.failure, vec!["t1", "t2"]);
        assert_eq!(report.pass_to_pass.failure, vec!["t3"]);
        assert_eq!(report.fail_to_fail.failure, vec!["t4"]);
        assert!(report.pass_to_fail.failure.is_empty());
    }
}
