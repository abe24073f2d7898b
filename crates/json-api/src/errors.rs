//! Error responses shared by every resource.

use salvo::http::StatusError;

use greenlight_app::validator::FieldErrors;

/// `422` carrying the per-field messages as a JSON object in its detail.
pub(crate) fn failed_validation(errors: &FieldErrors) -> StatusError {
    let detail = serde_json::to_string(errors).unwrap_or_default();

    StatusError::unprocessable_entity()
        .brief("Request failed validation")
        .detail(detail)
}

/// `404` for ids that can never name a record.
pub(crate) fn not_found() -> StatusError {
    StatusError::not_found().brief("The requested resource could not be found")
}
