//! Admission refusals as HTTP responses.

use salvo::{
    http::{
        StatusError,
        header::{HeaderValue, WWW_AUTHENTICATE},
    },
    prelude::{FlowCtrl, Response},
};
use tracing::error;

use greenlight_app::admission::AdmissionError;

use crate::observability::observe_admission_refusal;

pub(crate) fn into_status_error(error: AdmissionError) -> StatusError {
    match error {
        AdmissionError::RateLimited => StatusError::too_many_requests().brief("Rate limit exceeded"),
        AdmissionError::InvalidCredentialFormat | AdmissionError::InvalidCredential => {
            StatusError::unauthorized().brief("Invalid or missing authentication token")
        }
        AdmissionError::AuthenticationRequired => StatusError::unauthorized()
            .brief("You must be authenticated to access this resource"),
        AdmissionError::ActivationRequired => StatusError::forbidden()
            .brief("Your user account must be activated to access this resource"),
        AdmissionError::Forbidden => StatusError::forbidden().brief(
            "Your user account doesn't have the necessary permissions to access this resource",
        ),
        AdmissionError::Transient(source) => {
            error!("failed to decide admission: {source}");

            StatusError::internal_server_error()
        }
    }
}

/// Render `error` and stop the request here.
pub(super) fn refuse(res: &mut Response, ctrl: &mut FlowCtrl, error: AdmissionError) {
    observe_admission_refusal(error.reason());

    if matches!(
        error,
        AdmissionError::InvalidCredentialFormat | AdmissionError::InvalidCredential
    ) {
        res.headers_mut()
            .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    }

    res.render(into_status_error(error));
    ctrl.skip_rest();
}
