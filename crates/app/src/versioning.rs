//! Optimistic concurrency for mutable records.
//!
//! Every mutable record carries a [`Version`] that starts at 1 and moves forward by
//! exactly one on each successful write. Writers state the version they read; the
//! store applies the write only if that version is still current. A write that
//! matches nothing, because the record moved on or disappeared, surfaces as a single
//! [`UpdateError::EditConflict`] so callers have one contract: reload and retry.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(i32);

impl Version {
    /// Version of a freshly inserted record.
    pub const INITIAL: Self = Self(1);

    #[must_use]
    pub const fn new(version: i32) -> Self {
        Self(version)
    }

    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i32> for Version {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

/// A record that participates in optimistic concurrency.
pub trait Versioned {
    fn version(&self) -> Version;

    fn set_version(&mut self, version: Version);
}

/// Conditional write half of a record store.
#[async_trait]
pub trait VersionedStore<R: Sync>: Send + Sync {
    /// Persist `record` only if the stored version still equals `expected`, bumping the
    /// stored version by one. Returns the new version, or `None` when no record matched.
    async fn write_if_version_matches(
        &self,
        record: &R,
        expected: Version,
    ) -> Result<Option<Version>, StoreError>;
}

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("unable to update the record due to an edit conflict, please try again")]
    EditConflict,

    #[error("record update violates a uniqueness constraint")]
    AlreadyExists,

    #[error("store returned version {actual} after writing over version {expected}")]
    Invariant { expected: Version, actual: Version },

    #[error("storage error")]
    Store(#[source] StoreError),
}

/// Write `record` through `store`, expecting the version it currently carries.
///
/// On success the record's version is advanced to the stored value, which is always
/// exactly one past the version it was read at.
///
/// # Errors
///
/// Returns [`UpdateError::EditConflict`] when the record was concurrently modified or
/// deleted, [`UpdateError::Invariant`] when the store advanced the version by anything
/// other than one, and [`UpdateError::Store`] for storage failures (timeouts included).
pub async fn update_if_version_matches<R, S>(store: &S, record: &mut R) -> Result<Version, UpdateError>
where
    R: Versioned + Send + Sync,
    S: VersionedStore<R> + ?Sized,
{
    let expected = record.version();

    match store.write_if_version_matches(record, expected).await {
        Ok(Some(actual)) if actual == expected.next() => {
            record.set_version(actual);

            Ok(actual)
        }
        Ok(Some(actual)) => {
            error!(%expected, %actual, "conditional update skipped a version");

            Err(UpdateError::Invariant { expected, actual })
        }
        Ok(None) | Err(StoreError::NotFound) => Err(UpdateError::EditConflict),
        Err(StoreError::AlreadyExists) => Err(UpdateError::AlreadyExists),
        Err(error) => Err(UpdateError::Store(error)),
    }
}
