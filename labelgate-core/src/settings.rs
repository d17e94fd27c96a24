//! Policy settings: which criterion to apply and the label keys it refers to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use crate::labels::LabelKeyChecker;
use crate::{PolicyError, Result};

/// Validation rule selecting denylist or allowlist semantics over label keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criterion {
    DoesNotContainAnyOf,
    DoesNotContainOtherThan,
}

impl Criterion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Criterion::DoesNotContainAnyOf => "doesNotContainAnyOf",
            Criterion::DoesNotContainOtherThan => "doesNotContainOtherThan",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Criterion {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "doesNotContainAnyOf" => Ok(Criterion::DoesNotContainAnyOf),
            "doesNotContainOtherThan" => Ok(Criterion::DoesNotContainOtherThan),
            other => Err(PolicyError::Config(format!(
                "unknown criterion `{other}`, expected one of `doesNotContainAnyOf`, `doesNotContainOtherThan`"
            ))),
        }
    }
}

/// Settings document, e.g. `{"criteria": "doesNotContainAnyOf", "values": ["cc-center"]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "criteria", rename_all = "camelCase")]
pub enum Settings {
    /// `values` is a denylist of label keys
    DoesNotContainAnyOf {
        #[serde(default)]
        values: Vec<String>,
    },
    /// `values` is an allowlist of label keys
    DoesNotContainOtherThan {
        #[serde(default)]
        values: Vec<String>,
    },
}

impl Settings {
    pub fn new(criterion: Criterion, values: Vec<String>) -> Self {
        match criterion {
            Criterion::DoesNotContainAnyOf => Settings::DoesNotContainAnyOf { values },
            Criterion::DoesNotContainOtherThan => Settings::DoesNotContainOtherThan { values },
        }
    }

    /// Parse settings from a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| PolicyError::Config(format!("invalid settings: {e}")))
    }

    /// Parse settings from a YAML document
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml)
            .map_err(|e| PolicyError::Config(format!("invalid settings: {e}")))
    }

    /// Convert settings already held as a JSON value (e.g. embedded in a request)
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| PolicyError::Config(format!("invalid settings: {e}")))
    }

    pub fn criterion(&self) -> Criterion {
        match self {
            Settings::DoesNotContainAnyOf { .. } => Criterion::DoesNotContainAnyOf,
            Settings::DoesNotContainOtherThan { .. } => Criterion::DoesNotContainOtherThan,
        }
    }

    pub fn values(&self) -> &[String] {
        match self {
            Settings::DoesNotContainAnyOf { values } | Settings::DoesNotContainOtherThan { values } => {
                values
            }
        }
    }

    /// Reject values that are not valid Kubernetes label keys.
    ///
    /// An empty value list is accepted: the denylist then matches nothing and
    /// the allowlist permits nothing.
    pub fn validate(&self) -> Result<()> {
        let checker = LabelKeyChecker::new()?;
        let invalid: Vec<String> = self
            .values()
            .iter()
            .filter_map(|key| checker.check(key))
            .collect();

        if invalid.is_empty() {
            return Ok(());
        }

        warn!(criterion = %self.criterion(), invalid = ?invalid, "Settings contain invalid label names");
        Err(PolicyError::InvalidSettings(format!(
            "Invalid label names: {}",
            invalid.join(", ")
        )))
    }
}
