//! Users Repository

use async_trait::async_trait;
use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query_as, query_scalar};

use crate::{
    auth::{TokenDigest, TokenScope},
    domain::users::{
        data::NewUserRecord,
        password::Password,
        records::{UserId, UserRecord},
    },
    store::{StoreError, bounded},
    versioning::{Version, VersionedStore},
};

const INSERT_USER_SQL: &str = include_str!("sql/insert_user.sql");
const GET_USER_SQL: &str = include_str!("sql/get_user.sql");
const GET_USER_BY_EMAIL_SQL: &str = include_str!("sql/get_user_by_email.sql");
const FIND_USER_BY_TOKEN_SQL: &str = include_str!("sql/find_user_by_token.sql");
const UPDATE_USER_SQL: &str = include_str!("sql/update_user.sql");

/// User persistence. Conditional updates come from [`VersionedStore`].
#[async_trait]
pub trait UsersRepository: VersionedStore<UserRecord> {
    /// Insert a user. A taken e-mail address is [`StoreError::AlreadyExists`].
    async fn insert_user(&self, user: &NewUserRecord) -> Result<UserRecord, StoreError>;

    async fn get_user(&self, user: UserId) -> Result<UserRecord, StoreError>;

    async fn get_user_by_email(&self, email: &str) -> Result<UserRecord, StoreError>;

    /// Owner of the token with `digest` and `scope` whose expiry is after `now`.
    async fn find_user_by_token(
        &self,
        digest: &TokenDigest,
        scope: TokenScope,
        now: Timestamp,
    ) -> Result<UserRecord, StoreError>;
}

#[derive(Debug, Clone)]
pub struct PgUsersRepository {
    pool: PgPool,
}

impl PgUsersRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsersRepository for PgUsersRepository {
    async fn insert_user(&self, user: &NewUserRecord) -> Result<UserRecord, StoreError> {
        bounded(async {
            let inserted = query_as::<Postgres, UserRecord>(INSERT_USER_SQL)
                .bind(&user.name)
                .bind(&user.email)
                .bind(&user.password_hash)
                .bind(user.activated)
                .fetch_one(&self.pool)
                .await?;

            Ok(inserted)
        })
        .await
    }

    async fn get_user(&self, user: UserId) -> Result<UserRecord, StoreError> {
        bounded(async {
            let found = query_as::<Postgres, UserRecord>(GET_USER_SQL)
                .bind(user.into_i64())
                .fetch_one(&self.pool)
                .await?;

            Ok(found)
        })
        .await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<UserRecord, StoreError> {
        bounded(async {
            let found = query_as::<Postgres, UserRecord>(GET_USER_BY_EMAIL_SQL)
                .bind(email)
                .fetch_one(&self.pool)
                .await?;

            Ok(found)
        })
        .await
    }

    async fn find_user_by_token(
        &self,
        digest: &TokenDigest,
        scope: TokenScope,
        now: Timestamp,
    ) -> Result<UserRecord, StoreError> {
        bounded(async {
            let found = query_as::<Postgres, UserRecord>(FIND_USER_BY_TOKEN_SQL)
                .bind(digest.as_bytes().as_slice())
                .bind(scope.as_str())
                .bind(SqlxTimestamp::from(now))
                .fetch_one(&self.pool)
                .await?;

            Ok(found)
        })
        .await
    }
}

#[async_trait]
impl VersionedStore<UserRecord> for PgUsersRepository {
    async fn write_if_version_matches(
        &self,
        record: &UserRecord,
        expected: Version,
    ) -> Result<Option<Version>, StoreError> {
        bounded(async {
            let version = query_scalar::<Postgres, i32>(UPDATE_USER_SQL)
                .bind(&record.name)
                .bind(&record.email)
                .bind(record.password.hash())
                .bind(record.activated)
                .bind(record.id.into_i64())
                .bind(expected.get())
                .fetch_optional(&self.pool)
                .await?;

            Ok(version.map(Version::new))
        })
        .await
    }
}

impl<'r> FromRow<'r, PgRow> for UserRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: UserId::from_i64(row.try_get("id")?),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password: Password::from_hash(row.try_get("password_hash")?),
            activated: row.try_get("activated")?,
            version: Version::new(row.try_get("version")?),
        })
    }
}
