//! Token repository.

use async_trait::async_trait;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{PgPool, query};

use crate::{
    auth::{NewToken, TokenScope},
    domain::users::records::UserId,
    store::{StoreError, bounded},
};

const INSERT_TOKEN_SQL: &str = include_str!("sql/insert_token.sql");
const DELETE_TOKENS_FOR_USER_SQL: &str = include_str!("sql/delete_tokens_for_user.sql");

/// Token persistence. Lookup by digest lives with the users it resolves to.
#[async_trait]
pub trait TokensRepository: Send + Sync {
    async fn insert_token(&self, token: &NewToken) -> Result<(), StoreError>;

    /// Delete every token of `scope` owned by `user`, returning how many went.
    async fn delete_tokens_for_user(
        &self,
        scope: TokenScope,
        user: UserId,
    ) -> Result<u64, StoreError>;
}

#[derive(Debug, Clone)]
pub struct PgTokensRepository {
    pool: PgPool,
}

impl PgTokensRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokensRepository for PgTokensRepository {
    async fn insert_token(&self, token: &NewToken) -> Result<(), StoreError> {
        bounded(async {
            query(INSERT_TOKEN_SQL)
                .bind(token.digest.as_bytes().as_slice())
                .bind(token.user_id.into_i64())
                .bind(SqlxTimestamp::from(token.expires_at))
                .bind(token.scope.as_str())
                .execute(&self.pool)
                .await?;

            Ok(())
        })
        .await
    }

    async fn delete_tokens_for_user(
        &self,
        scope: TokenScope,
        user: UserId,
    ) -> Result<u64, StoreError> {
        bounded(async {
            let rows_affected = query(DELETE_TOKENS_FOR_USER_SQL)
                .bind(scope.as_str())
                .bind(user.into_i64())
                .execute(&self.pool)
                .await?
                .rows_affected();

            Ok(rows_affected)
        })
        .await
    }
}
