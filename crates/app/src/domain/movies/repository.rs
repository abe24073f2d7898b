//! Movies Repository

use async_trait::async_trait;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query, query_as, query_scalar};

use crate::{
    domain::movies::{
        data::NewMovie,
        records::{MovieId, MovieRecord, Runtime},
    },
    store::{StoreError, bounded},
    versioning::{Version, VersionedStore},
};

const INSERT_MOVIE_SQL: &str = include_str!("sql/insert_movie.sql");
const GET_MOVIE_SQL: &str = include_str!("sql/get_movie.sql");
const UPDATE_MOVIE_SQL: &str = include_str!("sql/update_movie.sql");
const DELETE_MOVIE_SQL: &str = include_str!("sql/delete_movie.sql");

#[async_trait]
pub trait MoviesRepository: VersionedStore<MovieRecord> {
    async fn insert_movie(&self, movie: &NewMovie) -> Result<MovieRecord, StoreError>;

    async fn get_movie(&self, movie: MovieId) -> Result<MovieRecord, StoreError>;

    /// Delete a movie, returning how many rows went.
    async fn delete_movie(&self, movie: MovieId) -> Result<u64, StoreError>;
}

#[derive(Debug, Clone)]
pub struct PgMoviesRepository {
    pool: PgPool,
}

impl PgMoviesRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MoviesRepository for PgMoviesRepository {
    async fn insert_movie(&self, movie: &NewMovie) -> Result<MovieRecord, StoreError> {
        bounded(async {
            let inserted = query_as::<Postgres, MovieRecord>(INSERT_MOVIE_SQL)
                .bind(&movie.title)
                .bind(movie.year)
                .bind(movie.runtime.0)
                .bind(&movie.genres)
                .fetch_one(&self.pool)
                .await?;

            Ok(inserted)
        })
        .await
    }

    async fn get_movie(&self, movie: MovieId) -> Result<MovieRecord, StoreError> {
        bounded(async {
            let found = query_as::<Postgres, MovieRecord>(GET_MOVIE_SQL)
                .bind(movie.into_i64())
                .fetch_one(&self.pool)
                .await?;

            Ok(found)
        })
        .await
    }

    async fn delete_movie(&self, movie: MovieId) -> Result<u64, StoreError> {
        bounded(async {
            let rows_affected = query(DELETE_MOVIE_SQL)
                .bind(movie.into_i64())
                .execute(&self.pool)
                .await?
                .rows_affected();

            Ok(rows_affected)
        })
        .await
    }
}

#[async_trait]
impl VersionedStore<MovieRecord> for PgMoviesRepository {
    async fn write_if_version_matches(
        &self,
        record: &MovieRecord,
        expected: Version,
    ) -> Result<Option<Version>, StoreError> {
        bounded(async {
            let version = query_scalar::<Postgres, i32>(UPDATE_MOVIE_SQL)
                .bind(&record.title)
                .bind(record.year)
                .bind(record.runtime.0)
                .bind(&record.genres)
                .bind(record.id.into_i64())
                .bind(expected.get())
                .fetch_optional(&self.pool)
                .await?;

            Ok(version.map(Version::new))
        })
        .await
    }
}

impl<'r> FromRow<'r, PgRow> for MovieRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: MovieId::from_i64(row.try_get("id")?),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            title: row.try_get("title")?,
            year: row.try_get("year")?,
            runtime: Runtime(row.try_get("runtime")?),
            genres: row.try_get("genres")?,
            version: Version::new(row.try_get("version")?),
        })
    }
}
