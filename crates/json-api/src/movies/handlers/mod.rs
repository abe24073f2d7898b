//! Movie Handlers

pub(crate) mod create;
pub(crate) mod delete;
pub(crate) mod get;
pub(crate) mod update;

use salvo::http::StatusError;

use greenlight_app::domain::movies::records::MovieId;

use crate::errors::not_found;

/// Ids below one never name a movie.
fn movie_id(id: i64) -> Result<MovieId, StatusError> {
    if id < 1 {
        return Err(not_found());
    }

    Ok(MovieId::from_i64(id))
}
