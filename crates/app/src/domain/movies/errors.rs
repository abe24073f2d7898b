//! Movies service errors.

use thiserror::Error;

use crate::{store::StoreError, validator::FieldErrors, versioning::UpdateError};

#[derive(Debug, Error)]
pub enum MoviesServiceError {
    #[error("movie failed validation")]
    Invalid(FieldErrors),

    #[error("movie not found")]
    NotFound,

    #[error("unable to update the movie due to an edit conflict, please try again")]
    EditConflict,

    #[error("invariant violated: {0}")]
    Invariant(&'static str),

    #[error("storage error")]
    Store(#[source] StoreError),
}

impl From<StoreError> for MoviesServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound => Self::NotFound,
            other => Self::Store(other),
        }
    }
}

impl From<UpdateError> for MoviesServiceError {
    fn from(error: UpdateError) -> Self {
        match error {
            UpdateError::EditConflict => Self::EditConflict,
            UpdateError::AlreadyExists => Self::Invariant("movie update hit a uniqueness constraint"),
            UpdateError::Invariant { .. } => Self::Invariant("movie version advanced by more than one"),
            UpdateError::Store(store) => Self::Store(store),
        }
    }
}
