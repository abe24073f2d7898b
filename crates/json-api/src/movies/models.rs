//! Movie request parsing and response bodies.

use salvo::{http::StatusError, oapi::ToSchema};
use serde::{Deserialize, Serialize};

use greenlight_app::domain::movies::records::{MovieRecord, Runtime};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct MovieResponse {
    pub id: i64,
    pub title: String,
    pub year: i32,
    /// Runtime as `"<minutes> mins"`
    pub runtime: String,
    pub genres: Vec<String>,
    pub version: i32,
}

impl From<MovieRecord> for MovieResponse {
    fn from(movie: MovieRecord) -> Self {
        MovieResponse {
            id: movie.id.into_i64(),
            title: movie.title,
            year: movie.year,
            runtime: movie.runtime.to_string(),
            genres: movie.genres,
            version: movie.version.get(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct MovieEnvelope {
    pub movie: MovieResponse,
}

/// Parse an optional `"<minutes> mins"` runtime from a request body.
pub(crate) fn parse_runtime(runtime: Option<&str>) -> Result<Option<Runtime>, StatusError> {
    runtime
        .map(str::parse::<Runtime>)
        .transpose()
        .map_err(|_invalid| StatusError::bad_request().brief("Invalid runtime format"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_is_optional_but_must_be_well_formed() {
        assert!(matches!(parse_runtime(None), Ok(None)));
        assert!(matches!(parse_runtime(Some("107 mins")), Ok(Some(Runtime(107)))));
        assert!(parse_runtime(Some("107")).is_err());
    }
}
