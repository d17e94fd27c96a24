//! Label Validator - decides admission from a resource's label keys.
//!
//! Evaluation is a pure function of `(LabelSet, Settings)`: it never fails and
//! performs no I/O, so it is safe to call concurrently from any thread.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use crate::labels::LabelSet;
use crate::settings::Settings;

pub const INVALID_LABELS_PREFIX: &str = "The following invalid labels were found: ";
pub const UNEXPECTED_LABELS_PREFIX: &str =
    "The following labels were found that should not be present: ";

/// Result of one evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub allowed: bool,

    /// Present exactly when `allowed` is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Verdict {
    pub fn accept() -> Self {
        Self {
            allowed: true,
            message: None,
        }
    }

    pub fn reject(message: impl Into<String>) -> Self {
        Self {
            allowed: false,
            message: Some(message.into()),
        }
    }
}

/// Evaluate `labels` against the criterion selected by `settings`.
///
/// Offending keys are reported once each in ascending key order, joined by `", "`.
/// The message is only unambiguous for keys without `", "`; keys read from a
/// request are checked for Kubernetes key syntax before they get here.
pub fn evaluate(labels: &LabelSet, settings: &Settings) -> Verdict {
    let values: HashSet<&str> = settings.values().iter().map(String::as_str).collect();

    let (violations, prefix): (Vec<&str>, &str) = match settings {
        Settings::DoesNotContainAnyOf { .. } => (
            labels.keys().filter(|key| values.contains(key)).collect(),
            INVALID_LABELS_PREFIX,
        ),
        Settings::DoesNotContainOtherThan { .. } => (
            labels.keys().filter(|key| !values.contains(key)).collect(),
            UNEXPECTED_LABELS_PREFIX,
        ),
    };

    debug!(
        criterion = %settings.criterion(),
        label_count = labels.len(),
        violations = violations.len(),
        "Evaluated labels"
    );

    if violations.is_empty() {
        Verdict::accept()
    } else {
        Verdict::reject(format!("{prefix}{}", violations.join(", ")))
    }
}
