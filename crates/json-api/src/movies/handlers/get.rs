//! Get Movie Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};

use crate::{
    extensions::*,
    movies::{errors::into_status_error, models::MovieEnvelope},
    state::State,
};

use super::movie_id;

/// Get Movie Handler
///
/// Returns a movie.
#[endpoint(
    tags("movies"),
    summary = "Get Movie",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(
    id: PathParam<i64>,
    depot: &mut Depot,
) -> Result<Json<MovieEnvelope>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let movie = state
        .app
        .movies
        .get_movie(movie_id(id.into_inner())?)
        .await
        .map_err(into_status_error)?;

    Ok(Json(MovieEnvelope {
        movie: movie.into(),
    }))
}
