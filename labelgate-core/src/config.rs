//! Settings sources
//!
//! Settings are resolved from exactly one source. The caller picks the source;
//! [`SettingsSource::resolve`] applies the precedence used by the CLI.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::settings::{Criterion, Settings};
use crate::Result;

#[derive(Debug, Clone, PartialEq)]
pub enum SettingsSource {
    /// Inline JSON document
    Json(String),
    /// YAML (`.yml`/`.yaml`) or JSON file
    File(PathBuf),
    /// Criterion name and values given separately
    Flags { criterion: String, values: Vec<String> },
    /// Settings carried inside the request envelope
    Embedded(serde_json::Value),
    /// Nothing supplied; behaves like the empty document `{}`
    None,
}

impl SettingsSource {
    /// Pick the first available source in precedence order:
    /// inline JSON, file, flags, embedded, none.
    pub fn resolve(
        json: Option<String>,
        path: Option<PathBuf>,
        criterion: Option<String>,
        values: Vec<String>,
        embedded: Option<serde_json::Value>,
    ) -> Self {
        if let Some(json) = json {
            SettingsSource::Json(json)
        } else if let Some(path) = path {
            SettingsSource::File(path)
        } else if let Some(criterion) = criterion {
            SettingsSource::Flags { criterion, values }
        } else if let Some(embedded) = embedded {
            SettingsSource::Embedded(embedded)
        } else {
            SettingsSource::None
        }
    }

    pub fn load(&self) -> Result<Settings> {
        debug!(source = self.describe(), "Loading settings");
        match self {
            SettingsSource::Json(json) => Settings::from_json(json),
            SettingsSource::File(path) => load_file(path),
            SettingsSource::Flags { criterion, values } => {
                let criterion: Criterion = criterion.parse()?;
                Ok(Settings::new(criterion, values.clone()))
            }
            SettingsSource::Embedded(value) => Settings::from_value(value.clone()),
            SettingsSource::None => Settings::from_json("{}"),
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            SettingsSource::Json(_) => "inline-json",
            SettingsSource::File(_) => "file",
            SettingsSource::Flags { .. } => "flags",
            SettingsSource::Embedded(_) => "request",
            SettingsSource::None => "none",
        }
    }
}

fn load_file(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yml") | Some("yaml") => Settings::from_yaml(&content),
        _ => Settings::from_json(&content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PolicyError;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_precedence() {
        let source = SettingsSource::resolve(
            Some("{}".to_string()),
            Some(PathBuf::from("settings.yml")),
            Some("doesNotContainAnyOf".to_string()),
            vec![],
            None,
        );
        assert_eq!(source, SettingsSource::Json("{}".to_string()));

        let source = SettingsSource::resolve(
            None,
            None,
            Some("doesNotContainAnyOf".to_string()),
            vec!["foo".to_string()],
            Some(serde_json::json!({"criteria": "doesNotContainOtherThan"})),
        );
        assert_eq!(
            source,
            SettingsSource::Flags {
                criterion: "doesNotContainAnyOf".to_string(),
                values: vec!["foo".to_string()],
            }
        );

        let source = SettingsSource::resolve(None, None, None, vec![], None);
        assert_eq!(source, SettingsSource::None);
    }

    #[test]
    fn test_load_yaml_and_json_files() {
        let dir = TempDir::new().unwrap();

        let yaml = dir.path().join("settings.yaml");
        fs::write(&yaml, "criteria: doesNotContainAnyOf\nvalues: [cc-center]\n").unwrap();
        let settings = SettingsSource::File(yaml).load().unwrap();
        assert_eq!(settings.criterion(), Criterion::DoesNotContainAnyOf);
        assert_eq!(settings.values(), &["cc-center".to_string()]);

        let json = dir.path().join("settings.json");
        fs::write(&json, r#"{"criteria": "doesNotContainOtherThan", "values": ["app"]}"#).unwrap();
        let settings = SettingsSource::File(json).load().unwrap();
        assert_eq!(settings.criterion(), Criterion::DoesNotContainOtherThan);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = SettingsSource::File(PathBuf::from("/nonexistent/settings.yml"))
            .load()
            .unwrap_err();
        assert!(matches!(err, PolicyError::Io(_)));
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_flags_with_unknown_criterion() {
        let err = SettingsSource::Flags {
            criterion: "bogus".to_string(),
            values: vec![],
        }
        .load()
        .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_no_settings_fails() {
        let err = SettingsSource::None.load().unwrap_err();
        assert!(err.to_string().contains("missing field `criteria`"));
    }
}
