//! Policy entry points: settings validation and request validation.

use tracing::{debug, info};

use crate::config::SettingsSource;
use crate::request::ValidationRequest;
use crate::response::{SettingsValidationResponse, ValidationResponse};
use crate::settings::Settings;
use crate::validator;
use crate::Result;

/// Load and check settings.
///
/// Bad settings content is an answer, not an error; failures reading the
/// source (e.g. an unreadable settings file) are propagated.
pub fn validate_settings(source: &SettingsSource) -> Result<SettingsValidationResponse> {
    match source.load().and_then(|settings| settings.validate()) {
        Ok(()) => Ok(SettingsValidationResponse::accept()),
        Err(e) if e.is_configuration() => Ok(SettingsValidationResponse::reject(e.to_string())),
        Err(e) => Err(e),
    }
}

/// Evaluate the labels of one admission request.
///
/// Settings must already be validated; the only failure left is a request
/// whose labels cannot be read.
pub fn validate_request(
    request: &ValidationRequest,
    settings: &Settings,
) -> Result<ValidationResponse> {
    let labels = request.labels()?;
    debug!(uid = request.uid(), labels = ?labels, "Validating request");

    let verdict = validator::evaluate(&labels, settings);
    info!(
        uid = request.uid(),
        criterion = %settings.criterion(),
        allowed = verdict.allowed,
        "Request evaluated"
    );

    Ok(ValidationResponse::from_verdict(request.uid(), verdict))
}
