//! Response documents rendered back to the caller.

use serde::{Deserialize, Serialize};

use crate::validator::Verdict;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Admission answer for one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResponse {
    pub uid: String,
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl ValidationResponse {
    pub fn from_verdict(uid: impl Into<String>, verdict: Verdict) -> Self {
        let status = verdict.message.map(|message| Status {
            message: Some(message),
        });

        Self {
            uid: uid.into(),
            allowed: verdict.allowed,
            status,
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.status.as_ref().and_then(|s| s.message.as_deref())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Plain `key: value` lines, `message` only on rejection
    pub fn to_text(&self) -> String {
        let mut out = format!("allowed: {}\n", self.allowed);
        if let Some(message) = self.message() {
            out.push_str(&format!("message: {message}\n"));
        }
        out
    }
}

/// Answer to a settings validation call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsValidationResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SettingsValidationResponse {
    pub fn accept() -> Self {
        Self {
            valid: true,
            message: None,
        }
    }

    pub fn reject(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: Some(message.into()),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
