//! Token service errors.

use thiserror::Error;

use crate::{store::StoreError, validator::FieldErrors};

#[derive(Debug, Error)]
pub enum TokenServiceError {
    /// The presented plaintext is malformed; no lookup was attempted.
    #[error("token failed validation")]
    Invalid(FieldErrors),

    #[error("token not found")]
    NotFound,

    #[error("token expiry is out of range")]
    ExpiryOutOfRange(#[source] jiff::Error),

    #[error("storage error")]
    Store(#[source] StoreError),
}

impl From<StoreError> for TokenServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound => Self::NotFound,
            other => Self::Store(other),
        }
    }
}
