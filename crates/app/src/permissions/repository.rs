//! Permissions Repository

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, query, query_scalar};

use crate::{
    domain::users::records::UserId,
    permissions::{PermissionCode, PermissionSet},
    store::{StoreError, bounded},
};

const PERMISSIONS_FOR_USER_SQL: &str = include_str!("sql/permissions_for_user.sql");
const GRANT_PERMISSIONS_SQL: &str = include_str!("sql/grant_permissions.sql");

#[async_trait]
pub trait PermissionsRepository: Send + Sync {
    async fn permissions_for_user(&self, user: UserId) -> Result<PermissionSet, StoreError>;

    /// Grant each known code in `codes` to `user`, returning how many were newly granted.
    /// Unknown and already-held codes are skipped.
    async fn grant_permissions(
        &self,
        user: UserId,
        codes: &[PermissionCode],
    ) -> Result<u64, StoreError>;
}

#[derive(Debug, Clone)]
pub struct PgPermissionsRepository {
    pool: PgPool,
}

impl PgPermissionsRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PermissionsRepository for PgPermissionsRepository {
    async fn permissions_for_user(&self, user: UserId) -> Result<PermissionSet, StoreError> {
        bounded(async {
            let codes = query_scalar::<Postgres, String>(PERMISSIONS_FOR_USER_SQL)
                .bind(user.into_i64())
                .fetch_all(&self.pool)
                .await?;

            Ok(codes.into_iter().map(PermissionCode::new).collect())
        })
        .await
    }

    async fn grant_permissions(
        &self,
        user: UserId,
        codes: &[PermissionCode],
    ) -> Result<u64, StoreError> {
        let codes: Vec<&str> = codes.iter().map(PermissionCode::as_str).collect();

        bounded(async {
            let rows_affected = query(GRANT_PERMISSIONS_SQL)
                .bind(user.into_i64())
                .bind(&codes)
                .execute(&self.pool)
                .await?
                .rows_affected();

            Ok(rows_affected)
        })
        .await
    }
}
