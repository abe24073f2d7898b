//! Response helper extensions.

use salvo::{
    http::header::LOCATION,
    prelude::{Response, StatusCode, StatusError},
};
use tracing::error;

pub(crate) trait CreatedExt {
    /// Mark the response `201 Created` with `Location` pointing at `path`.
    fn created_at(&mut self, path: &str) -> Result<&mut Self, StatusError>;
}

impl CreatedExt for Response {
    fn created_at(&mut self, path: &str) -> Result<&mut Self, StatusError> {
        if let Err(error) = self.add_header(LOCATION, path, true) {
            error!(path, "failed to set location header: {error}");

            return Err(StatusError::internal_server_error());
        }

        Ok(self.status_code(StatusCode::CREATED))
    }
}
