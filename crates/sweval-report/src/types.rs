//! Core types for patch-evaluation reporting.
//!
//! Defines the data structures shared across classification, metrics, and
//! report generation.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Observed status of a single test case in an evaluation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestStatus {
    /// Test ran and passed
    Passed,
    /// Test ran and failed
    Failed,
    /// Test was collected but skipped
    Skipped,
    /// Test errored before producing a verdict
    Error,
}

/// Mapping from test identifier to its observed status for one run.
///
/// A test identifier absent from the map is a distinct, meaningful case:
/// the run produced no evidence either way for that test.
pub type StatusMap = HashMap<String, TestStatus>;

/// Gold expectation for a single benchmark instance.
///
/// Each set lists the test identifiers expected to make that transition
/// once the gold patch is applied. Identifiers are unique within a set and
/// appear in at most one set. Read-only after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskReference {
    /// Unique identifier for this instance (e.g., "django__django-11133")
    pub instance_id: String,

    /// Tests that should fail before the patch and pass after
    #[serde(rename = "FAIL_TO_PASS")]
    pub fail_to_pass: Vec<String>,

    /// Tests that should pass both before and after
    #[serde(rename = "PASS_TO_PASS")]
    pub pass_to_pass: Vec<String>,

    /// Tests expected to keep failing (extended category, optional)
    #[serde(rename = "FAIL_TO_FAIL", default)]
    pub fail_to_fail: Vec<String>,

    /// Tests expected to start failing (extended category, optional)
    #[serde(rename = "PASS_TO_FAIL", default)]
    pub pass_to_fail: Vec<String>,
}

/// One model-generated patch attempt for a benchmark instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    /// Instance the patch targets
    pub instance_id: String,

    /// The generated patch, or `None` if the model produced nothing
    pub model_patch: Option<String>,
}

impl Prediction {
    /// Repository key this prediction groups under.
    pub fn repo_key(&self) -> String {
        repo_key(&self.instance_id)
    }
}

/// Derive the repository key from an instance identifier.
///
/// The identifier is truncated at the first `.`, the trailing
/// dash-delimited suffix is stripped, and the `__` owner/name separator is
/// replaced with `/`: `"django__django-12345"` -> `"django/django"`.
/// Downstream grouping depends on this exact transformation.
pub fn repo_key(instance_id: &str) -> String {
    let head = instance_id.split('.').next().unwrap_or(instance_id);
    let head = match head.rsplit_once('-') {
        Some((prefix, _)) => prefix,
        None => head,
    };
    head.replace("__", "/")
}

/// Observed outcome of applying one prediction and running its tests.
///
/// Modeled as a sum type so the two downstream paths are exhaustively
/// matched rather than gated on a flag.
#[derive(Debug, Clone)]
pub enum EvalRun {
    /// The patch applied and tests produced a status map
    Completed(StatusMap),
    /// The patch could not be applied at all; no tests ran
    PatchApplyFailed,
}

/// Observed outcome for one gold transition category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryOutcome {
    /// Tests observed to match the gold expectation direction
    pub success: Vec<String>,
    /// Tests observed to contradict the gold expectation
    pub failure: Vec<String>,
}

impl CategoryOutcome {
    /// Synthesize an outcome where every gold test is a failure.
    pub fn all_failures(tests: &[String]) -> Self {
        Self {
            success: Vec::new(),
            failure: tests.to_vec(),
        }
    }
}

/// Categorized report for one (instance, run) pair.
///
/// Built fresh per run and never mutated afterwards; aggregation only ever
/// reads these.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceReport {
    #[serde(rename = "FAIL_TO_PASS")]
    pub fail_to_pass: CategoryOutcome,

    #[serde(rename = "PASS_TO_PASS")]
    pub pass_to_pass: CategoryOutcome,

    #[serde(rename = "FAIL_TO_FAIL")]
    pub fail_to_fail: CategoryOutcome,

    #[serde(rename = "PASS_TO_FAIL")]
    pub pass_to_fail: CategoryOutcome,
}

/// Verdict summarizing how well a run satisfied the gold expectation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResolutionStatus {
    /// Every expected test flipped or held as the gold transition predicts
    #[serde(rename = "RESOLVED_FULL")]
    Full,
    /// Some fail-to-pass tests succeeded, but failures remain
    #[serde(rename = "RESOLVED_PARTIAL")]
    Partial,
    /// No fail-to-pass test succeeded
    #[serde(rename = "RESOLVED_NO")]
    No,
}

impl ResolutionStatus {
    /// Upstream wire name for this verdict.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionStatus::Full => "RESOLVED_FULL",
            ResolutionStatus::Partial => "RESOLVED_PARTIAL",
            ResolutionStatus::No => "RESOLVED_NO",
        }
    }
}

impl std::fmt::Display for ResolutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Funnel stage lists for one repository.
///
/// Each stage list is a superset of the next for a given repository:
/// `resolved` ⊆ `applied` ⊆ `with_logs` ⊆ `generated`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepoFunnel {
    /// Predictions with no patch at all
    pub none: Vec<String>,
    /// Predictions that produced a patch
    pub generated: Vec<String>,
    /// Predictions whose evaluation log exists on disk
    pub with_logs: Vec<String>,
    /// Predictions whose patch applied and tests ran
    pub applied: Vec<String>,
    /// Predictions graded as fully resolved
    pub resolved: Vec<String>,
}

/// Report map keyed by repository, the sole mutable accumulator in the
/// pipeline. `BTreeMap` keeps serialized output deterministic.
pub type ReportMap = BTreeMap<String, RepoFunnel>;
