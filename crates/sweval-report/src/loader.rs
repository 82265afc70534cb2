//! Input loading: task references and prediction records.
//!
//! Both inputs are loaded once and treated as read-only. Malformed
//! records are fatal for their file: aggregate statistics are only
//! meaningful over complete, well-formed input, so there is no
//! best-effort parsing here.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::error::{ReportError, Result};
use crate::types::{Prediction, TaskReference};

/// Load task references from a JSON array, keyed by instance identifier.
pub fn load_task_references(path: &Path) -> Result<HashMap<String, TaskReference>> {
    if !path.is_file() {
        return Err(ReportError::MissingInput(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    let references: Vec<TaskReference> = serde_json::from_str(&content)?;

    debug!("loaded {} task references from {}", references.len(), path.display());
    Ok(references
        .into_iter()
        .map(|reference| (reference.instance_id.clone(), reference))
        .collect())
}

/// Load predictions from a JSON array, or line-delimited JSON when the
/// path carries a recognized line-delimited extension.
pub fn load_predictions(path: &Path) -> Result<Vec<Prediction>> {
    if !path.is_file() {
        return Err(ReportError::MissingInput(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;

    let predictions = if is_line_delimited(path) {
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(serde_json::from_str)
            .collect::<std::result::Result<Vec<Prediction>, _>>()?
    } else {
        serde_json::from_str(&content)?
    };

    debug!("loaded {} predictions from {}", predictions.len(), path.display());
    Ok(predictions)
}

fn is_line_delimited(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "jsonl" || ext == "ndjson")
}
