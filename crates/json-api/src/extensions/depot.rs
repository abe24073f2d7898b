//! Depot helper extensions.

use std::any::Any;

use salvo::prelude::{Depot, StatusError};

use greenlight_app::{admission::Admission, domain::users::records::UserRecord};

/// Helpers for mapping depot extraction failures to HTTP errors.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;

    /// The caller admitted for this request. Routes reaching this are behind a
    /// guard, so an anonymous caller here is a routing mistake.
    fn current_user_or_500(&self) -> Result<&UserRecord, StatusError>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>()
            .map_err(|_ignored| StatusError::internal_server_error())
    }

    fn current_user_or_500(&self) -> Result<&UserRecord, StatusError> {
        self.obtain_or_500::<Admission>()?
            .identity
            .user()
            .ok_or_else(StatusError::internal_server_error)
    }
}
