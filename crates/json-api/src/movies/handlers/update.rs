//! Update Movie Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};

use greenlight_app::{domain::movies::data::MovieUpdate, versioning::Version};

use crate::{
    extensions::*,
    movies::{
        errors::into_status_error,
        models::{MovieEnvelope, parse_runtime},
    },
    state::State,
};

use super::movie_id;

/// Version the client last read. When sent, the update only applies on top of it.
pub(crate) const EXPECTED_VERSION_HEADER: &str = "x-expected-version";

/// Update Movie Request. Absent fields keep their stored value.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub(crate) struct UpdateMovieRequest {
    pub title: Option<String>,
    pub year: Option<i32>,
    pub runtime: Option<String>,
    pub genres: Option<Vec<String>>,
}

/// Update Movie Handler
#[endpoint(
    tags("movies"),
    summary = "Update Movie",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Movie updated"),
        (status_code = StatusCode::NOT_FOUND, description = "Movie not found"),
        (status_code = StatusCode::CONFLICT, description = "Edit conflict"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Validation failed"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "movies.update",
    skip(id, json, req, depot),
    fields(
        movie_id = tracing::field::Empty,
        user_id = tracing::field::Empty,
        expected_version = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    id: PathParam<i64>,
    json: JsonBody<UpdateMovieRequest>,
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<MovieEnvelope>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.current_user_or_500()?;
    let movie = movie_id(id.into_inner())?;
    let expected = expected_version(req)?;
    let request = json.into_inner();

    let span = tracing::Span::current();

    span.record("movie_id", tracing::field::display(movie));
    span.record("user_id", tracing::field::display(user.id));

    if let Some(expected) = expected {
        span.record("expected_version", tracing::field::display(expected));
    }

    let update = MovieUpdate {
        title: request.title,
        year: request.year,
        runtime: parse_runtime(request.runtime.as_deref())?,
        genres: request.genres,
    };

    let movie = state
        .app
        .movies
        .update_movie(movie, update, expected)
        .await
        .map_err(into_status_error)?;

    tracing::info!(movie_id = %movie.id, version = %movie.version, "updated movie");

    Ok(Json(MovieEnvelope {
        movie: movie.into(),
    }))
}

fn expected_version(req: &Request) -> Result<Option<Version>, StatusError> {
    let Some(value) = req.headers().get(EXPECTED_VERSION_HEADER) else {
        return Ok(None);
    };

    value
        .to_str()
        .ok()
        .and_then(|value| value.trim().parse::<i32>().ok())
        .map(|version| Some(Version::new(version)))
        .ok_or_else(|| StatusError::bad_request().brief("X-Expected-Version must be an integer"))
}
