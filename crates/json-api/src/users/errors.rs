//! User Errors

use salvo::http::StatusError;
use tracing::error;

use greenlight_app::{auth::TokenServiceError, domain::users::UsersServiceError};

use crate::errors::{failed_validation, not_found};

pub(crate) fn into_status_error(error: UsersServiceError) -> StatusError {
    match error {
        UsersServiceError::Invalid(errors)
        | UsersServiceError::Token(TokenServiceError::Invalid(errors)) => {
            failed_validation(&errors)
        }
        UsersServiceError::NotFound => not_found(),
        UsersServiceError::InvalidCredentials => {
            StatusError::unauthorized().brief("Invalid authentication credentials")
        }
        UsersServiceError::EditConflict => StatusError::conflict()
            .brief("Unable to update the record due to an edit conflict, please try again"),
        UsersServiceError::Invariant(invariant) => {
            error!("user invariant violated: {invariant}");

            StatusError::internal_server_error()
        }
        UsersServiceError::Password(source) => {
            error!("failed to process password: {source}");

            StatusError::internal_server_error()
        }
        UsersServiceError::Token(source) => {
            error!("failed to process token: {source}");

            StatusError::internal_server_error()
        }
        UsersServiceError::Store(source) => {
            error!("failed to access user records: {source}");

            StatusError::internal_server_error()
        }
    }
}
