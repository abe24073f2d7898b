//! Record store errors and request-scoped timeouts.

use std::{future::Future, time::Duration};

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;
use tokio::time::timeout;

/// Upper bound for any single store round-trip made on behalf of a request.
pub const STORE_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("record already exists")]
    AlreadyExists,

    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl StoreError {
    /// Whether retrying the same operation later could succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Sql(error) => matches!(
                error,
                Error::PoolTimedOut | Error::PoolClosed | Error::Io(_) | Error::WorkerCrashed
            ),
            Self::NotFound | Self::AlreadyExists => false,
        }
    }
}

impl From<Error> for StoreError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}

/// Run a store operation under [`STORE_TIMEOUT`].
///
/// # Errors
///
/// Returns [`StoreError::Timeout`] when the deadline passes, otherwise whatever the
/// operation itself returned.
pub async fn bounded<T, F>(operation: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    timeout(STORE_TIMEOUT, operation)
        .await
        .map_err(|_elapsed| StoreError::Timeout(STORE_TIMEOUT))?
}
