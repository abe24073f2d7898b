//! Movie Errors

use salvo::http::StatusError;
use tracing::error;

use greenlight_app::domain::movies::MoviesServiceError;

use crate::errors::{failed_validation, not_found};

pub(crate) fn into_status_error(error: MoviesServiceError) -> StatusError {
    match error {
        MoviesServiceError::Invalid(errors) => failed_validation(&errors),
        MoviesServiceError::NotFound => not_found(),
        MoviesServiceError::EditConflict => StatusError::conflict()
            .brief("Unable to update the record due to an edit conflict, please try again"),
        MoviesServiceError::Invariant(invariant) => {
            error!("movie invariant violated: {invariant}");

            StatusError::internal_server_error()
        }
        MoviesServiceError::Store(source) => {
            error!("failed to access movie records: {source}");

            StatusError::internal_server_error()
        }
    }
}
