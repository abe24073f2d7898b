//! Users service errors.

use argon2::password_hash::Error as HashError;
use thiserror::Error;

use crate::{
    auth::TokenServiceError,
    store::StoreError,
    validator::FieldErrors,
    versioning::UpdateError,
};

#[derive(Debug, Error)]
pub enum UsersServiceError {
    #[error("user failed validation")]
    Invalid(FieldErrors),

    #[error("user not found")]
    NotFound,

    /// Unknown e-mail and wrong password are deliberately indistinguishable.
    #[error("invalid authentication credentials")]
    InvalidCredentials,

    #[error("unable to update the user due to an edit conflict, please try again")]
    EditConflict,

    #[error("invariant violated: {0}")]
    Invariant(&'static str),

    #[error("password hashing failed")]
    Password(#[source] HashError),

    #[error("token error")]
    Token(#[source] TokenServiceError),

    #[error("storage error")]
    Store(#[source] StoreError),
}

impl From<StoreError> for UsersServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound => Self::NotFound,
            other => Self::Store(other),
        }
    }
}

impl From<HashError> for UsersServiceError {
    fn from(error: HashError) -> Self {
        Self::Password(error)
    }
}

impl From<TokenServiceError> for UsersServiceError {
    fn from(error: TokenServiceError) -> Self {
        match error {
            TokenServiceError::Store(store) => Self::Store(store),
            other => Self::Token(other),
        }
    }
}

impl From<UpdateError> for UsersServiceError {
    fn from(error: UpdateError) -> Self {
        match error {
            UpdateError::EditConflict => Self::EditConflict,
            UpdateError::AlreadyExists => Self::Invalid(FieldErrors::from([(
                "email".to_string(),
                "a user with this email address already exists".to_string(),
            )])),
            UpdateError::Invariant { .. } => Self::Invariant("user version advanced by more than one"),
            UpdateError::Store(store) => Self::Store(store),
        }
    }
}
