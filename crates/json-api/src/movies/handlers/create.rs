//! Create Movie Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use greenlight_app::domain::movies::data::NewMovie;

use crate::{
    extensions::*,
    movies::{
        errors::into_status_error,
        models::{MovieEnvelope, parse_runtime},
    },
    state::State,
};

/// Create Movie Request
///
/// Missing fields are reported by validation rather than rejected as malformed.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub(crate) struct CreateMovieRequest {
    pub title: String,
    pub year: i32,
    pub runtime: Option<String>,
    pub genres: Vec<String>,
}

/// Create Movie Handler
#[endpoint(
    tags("movies"),
    summary = "Create Movie",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Movie created"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Validation failed"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(name = "movies.create", skip(json, depot, res), err)]
pub(crate) async fn handler(
    json: JsonBody<CreateMovieRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<MovieEnvelope>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.current_user_or_500()?;
    let request = json.into_inner();

    let movie = NewMovie {
        title: request.title,
        year: request.year,
        runtime: parse_runtime(request.runtime.as_deref())?.unwrap_or_default(),
        genres: request.genres,
    };

    let movie = state
        .app
        .movies
        .create_movie(movie)
        .await
        .map_err(into_status_error)?;

    info!(movie_id = %movie.id, user_id = %user.id, "created movie");

    res.created_at(&format!("/v1/movies/{}", movie.id))?;

    Ok(Json(MovieEnvelope {
        movie: movie.into(),
    }))
}
