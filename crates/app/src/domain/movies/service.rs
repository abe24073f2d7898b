//! Movies service.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::{Timestamp, tz::TimeZone};
use mockall::automock;
use tracing::debug;

use crate::{
    domain::movies::{
        MoviesRepository,
        data::{MovieUpdate, NewMovie},
        errors::MoviesServiceError,
        records::{MovieId, MovieRecord, Runtime},
    },
    validator::{Validator, unique},
    versioning::{Version, update_if_version_matches},
};

/// First year a film could have been released.
pub const EARLIEST_YEAR: i32 = 1888;

pub const TITLE_MAX_BYTES: usize = 500;
pub const GENRES_MAX: usize = 5;

#[derive(Clone)]
pub struct MovieCatalog {
    movies: Arc<dyn MoviesRepository>,
}

impl MovieCatalog {
    #[must_use]
    pub fn new(movies: Arc<dyn MoviesRepository>) -> Self {
        Self { movies }
    }
}

#[async_trait]
impl MoviesService for MovieCatalog {
    async fn create_movie(&self, movie: NewMovie) -> Result<MovieRecord, MoviesServiceError> {
        let mut v = Validator::new();

        validate_movie(&mut v, &movie.title, movie.year, movie.runtime, &movie.genres);

        v.finish().map_err(MoviesServiceError::Invalid)?;

        let created = self.movies.insert_movie(&movie).await?;

        debug!(movie_id = %created.id, "created movie");

        Ok(created)
    }

    async fn get_movie(&self, movie: MovieId) -> Result<MovieRecord, MoviesServiceError> {
        Ok(self.movies.get_movie(movie).await?)
    }

    async fn update_movie(
        &self,
        movie: MovieId,
        update: MovieUpdate,
        expected: Option<Version>,
    ) -> Result<MovieRecord, MoviesServiceError> {
        let mut record = self.movies.get_movie(movie).await?;

        if expected.is_some_and(|expected| expected != record.version) {
            return Err(MoviesServiceError::EditConflict);
        }

        if let Some(title) = update.title {
            record.title = title;
        }

        if let Some(year) = update.year {
            record.year = year;
        }

        if let Some(runtime) = update.runtime {
            record.runtime = runtime;
        }

        if let Some(genres) = update.genres {
            record.genres = genres;
        }

        let mut v = Validator::new();

        validate_movie(&mut v, &record.title, record.year, record.runtime, &record.genres);

        v.finish().map_err(MoviesServiceError::Invalid)?;

        update_if_version_matches(&*self.movies, &mut record).await?;

        debug!(movie_id = %record.id, version = %record.version, "updated movie");

        Ok(record)
    }

    async fn delete_movie(&self, movie: MovieId) -> Result<(), MoviesServiceError> {
        let rows_affected = self.movies.delete_movie(movie).await?;

        if rows_affected == 0 {
            return Err(MoviesServiceError::NotFound);
        }

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait MoviesService: Send + Sync {
    async fn create_movie(&self, movie: NewMovie) -> Result<MovieRecord, MoviesServiceError>;

    async fn get_movie(&self, movie: MovieId) -> Result<MovieRecord, MoviesServiceError>;

    /// Apply `update` through the version check. When `expected` is given it must
    /// match the stored version before anything is written.
    async fn update_movie(
        &self,
        movie: MovieId,
        update: MovieUpdate,
        expected: Option<Version>,
    ) -> Result<MovieRecord, MoviesServiceError>;

    async fn delete_movie(&self, movie: MovieId) -> Result<(), MoviesServiceError>;
}

pub fn validate_movie(v: &mut Validator, title: &str, year: i32, runtime: Runtime, genres: &[String]) {
    let current_year = i32::from(Timestamp::now().to_zoned(TimeZone::UTC).year());

    v.check(!title.is_empty(), "title", "must be provided");
    v.check(
        title.len() <= TITLE_MAX_BYTES,
        "title",
        "must not be more than 500 bytes long",
    );

    v.check(year != 0, "year", "must be provided");
    v.check(year >= EARLIEST_YEAR, "year", "must be greater than 1888");
    v.check(year <= current_year, "year", "must not be in the future");

    v.check(runtime.0 != 0, "runtime", "must be provided");
    v.check(runtime.0 > 0, "runtime", "must be a positive integer");

    v.check(!genres.is_empty(), "genres", "must contain at least 1 genre");
    v.check(genres.len() <= GENRES_MAX, "genres", "must not contain more than 5 genres");
    v.check(unique(genres), "genres", "must not contain duplicate values");
}
