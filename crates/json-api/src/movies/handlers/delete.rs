//! Delete Movie Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{extensions::*, movies::errors::into_status_error, state::State};

use super::movie_id;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct MovieDeletedResponse {
    pub message: String,
}

/// Delete Movie Handler
#[endpoint(
    tags("movies"),
    summary = "Delete Movie",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Movie deleted"),
        (status_code = StatusCode::NOT_FOUND, description = "Movie not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    id: PathParam<i64>,
    depot: &mut Depot,
) -> Result<Json<MovieDeletedResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.current_user_or_500()?;
    let movie = movie_id(id.into_inner())?;

    state
        .app
        .movies
        .delete_movie(movie)
        .await
        .map_err(into_status_error)?;

    info!(movie_id = %movie, user_id = %user.id, "deleted movie");

    Ok(Json(MovieDeletedResponse {
        message: "movie successfully deleted".to_owned(),
    }))
}

#[cfg(test)]
mod tests {
    use salvo::test::TestClient;

    use greenlight_app::domain::movies::{MockMoviesService, MoviesServiceError, records::MovieId};

    use crate::test_helpers::movies_service;

    use super::*;

    fn make_service(movies: MockMoviesService) -> Service {
        movies_service(movies, Router::with_path("v1/movies/{id}").delete(handler))
    }

    #[tokio::test]
    async fn test_delete_movie_success() {
        let mut movies = MockMoviesService::new();

        movies
            .expect_delete_movie()
            .once()
            .withf(|id| *id == MovieId::from_i64(8))
            .return_once(|_| Ok(()));

        let res = TestClient::delete("http://example.com/v1/movies/8")
            .send(&make_service(movies))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));
    }

    #[tokio::test]
    async fn test_delete_missing_movie_returns_404() {
        let mut movies = MockMoviesService::new();

        movies
            .expect_delete_movie()
            .once()
            .return_once(|_| Err(MoviesServiceError::NotFound));

        let res = TestClient::delete("http://example.com/v1/movies/8")
            .send(&make_service(movies))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));
    }
}
