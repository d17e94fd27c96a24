//! Admission request parsing.
//!
//! Accepts a full `AdmissionReview`, a validation envelope
//! (`{"request": ..., "settings": ...}`) or a bare admission request, and
//! extracts the labels of the embedded resource object.

use serde::Deserialize;
use serde_json::Value;
use tracing::trace;

use crate::labels::{LabelKeyChecker, LabelSet};
use crate::settings::Settings;
use crate::{PolicyError, Result};

/// Group/version/kind of the resource under review
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GroupVersionKind {
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub kind: String,
}

/// The parts of an admission request this policy looks at
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionRequest {
    #[serde(default)]
    pub uid: String,

    #[serde(default)]
    pub kind: Option<GroupVersionKind>,

    #[serde(default)]
    pub operation: Option<String>,

    #[serde(default)]
    pub object: Option<Value>,
}

/// A parsed request plus any settings that travelled with it
#[derive(Debug, Clone)]
pub struct ValidationRequest {
    pub request: AdmissionRequest,
    pub settings: Option<Value>,
}

impl ValidationRequest {
    pub fn from_json(json: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(json)
            .map_err(|e| PolicyError::Request(format!("Invalid request JSON: {e}")))?;
        Self::from_value(document)
    }

    pub fn from_value(document: Value) -> Result<Self> {
        let Value::Object(mut map) = document else {
            return Err(PolicyError::Request(
                "Request document must be a JSON object".to_string(),
            ));
        };

        let (request, settings) = match map.remove("request") {
            Some(inner @ Value::Object(_)) => {
                trace!("Unwrapping enveloped admission request");
                (inner, map.remove("settings").filter(|s| !s.is_null()))
            }
            Some(_) => {
                return Err(PolicyError::Request(
                    "`request` field must be a JSON object".to_string(),
                ))
            }
            None => {
                trace!("Treating document as a bare admission request");
                (Value::Object(map), None)
            }
        };

        let request: AdmissionRequest = serde_json::from_value(request)
            .map_err(|e| PolicyError::Request(format!("Invalid admission request: {e}")))?;

        Ok(Self { request, settings })
    }

    pub fn uid(&self) -> &str {
        &self.request.uid
    }

    /// Labels of the resource object; empty when the object carries none.
    ///
    /// Keys must be valid Kubernetes label keys, which keeps them free of the
    /// `", "` separator used in rejection messages.
    pub fn labels(&self) -> Result<LabelSet> {
        let labels = self
            .request
            .object
            .as_ref()
            .and_then(|object| object.get("metadata"))
            .and_then(|metadata| metadata.get("labels"));

        let labels = match labels {
            None | Some(Value::Null) => return Ok(LabelSet::new()),
            Some(labels) => LabelSet::deserialize(labels)
                .map_err(|e| PolicyError::Request(format!("Invalid metadata.labels: {e}")))?,
        };

        let checker = LabelKeyChecker::new()?;
        let invalid: Vec<String> = labels.keys().filter_map(|key| checker.check(key)).collect();
        if !invalid.is_empty() {
            return Err(PolicyError::Request(format!(
                "Invalid label keys in metadata.labels: {}",
                invalid.join("; ")
            )));
        }

        Ok(labels)
    }

    /// Settings embedded in the request envelope, if any
    pub fn embedded_settings(&self) -> Option<Result<Settings>> {
        self.settings.clone().map(Settings::from_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Criterion;
    use serde_json::json;

    #[test]
    fn test_bare_request_labels() {
        let request = ValidationRequest::from_value(json!({
            "uid": "abc-123",
            "operation": "CREATE",
            "object": {
                "metadata": {
                    "name": "tls-example-ingress",
                    "labels": {"owner": "team-a", "cc-center": "123"}
                }
            }
        }))
        .unwrap();

        assert_eq!(request.uid(), "abc-123");
        assert_eq!(request.request.operation.as_deref(), Some("CREATE"));
        let labels = request.labels().unwrap();
        assert_eq!(labels.keys().collect::<Vec<_>>(), vec!["cc-center", "owner"]);
    }

    #[test]
    fn test_admission_review_is_unwrapped() {
        let request = ValidationRequest::from_value(json!({
            "apiVersion": "admission.k8s.io/v1",
            "kind": "AdmissionReview",
            "request": {
                "uid": "review-1",
                "kind": {"group": "networking.k8s.io", "version": "v1", "kind": "Ingress"},
                "object": {"metadata": {"labels": {"app": "x"}}}
            }
        }))
        .unwrap();

        assert_eq!(request.uid(), "review-1");
        assert_eq!(request.request.kind.as_ref().map(|k| k.kind.as_str()), Some("Ingress"));
        assert!(request.labels().unwrap().contains_key("app"));
        assert!(request.embedded_settings().is_none());
    }

    #[test]
    fn test_envelope_carries_settings() {
        let request = ValidationRequest::from_value(json!({
            "request": {"uid": "env-1", "object": {"metadata": {}}},
            "settings": {"criteria": "doesNotContainAnyOf", "values": ["cc-center"]}
        }))
        .unwrap();

        let settings = request.embedded_settings().unwrap().unwrap();
        assert_eq!(settings.criterion(), Criterion::DoesNotContainAnyOf);
        assert!(request.labels().unwrap().is_empty());
    }

    #[test]
    fn test_missing_object_means_no_labels() {
        let request = ValidationRequest::from_value(json!({
            "uid": "delete-1",
            "operation": "DELETE",
            "object": null,
            "oldObject": {"metadata": {"labels": {"cc-center": "1"}}}
        }))
        .unwrap();

        assert!(request.labels().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_requests() {
        assert!(matches!(
            ValidationRequest::from_json("not json"),
            Err(PolicyError::Request(_))
        ));
        assert!(matches!(
            ValidationRequest::from_value(json!([1, 2])),
            Err(PolicyError::Request(_))
        ));
        assert!(matches!(
            ValidationRequest::from_value(json!({"request": "nope"})),
            Err(PolicyError::Request(_))
        ));

        let request = ValidationRequest::from_value(json!({
            "object": {"metadata": {"labels": ["app"]}}
        }))
        .unwrap();
        assert!(matches!(request.labels(), Err(PolicyError::Request(_))));
    }

    #[test]
    fn test_label_keys_with_separator_are_rejected() {
        let request = ValidationRequest::from_value(json!({
            "object": {"metadata": {"labels": {"app, cc-center": "x", "owner": "team-a"}}}
        }))
        .unwrap();

        let err = request.labels().unwrap_err();
        assert!(matches!(err, PolicyError::Request(_)));
        assert_eq!(
            err.to_string(),
            "Request error: Invalid label keys in metadata.labels: app, cc-center"
        );
    }
}
