//! App Context

use std::sync::Arc;

use sqlx::PgPool;
use thiserror::Error;

use crate::{
    admission::{AuthenticateStage, Pipeline, RateLimitStage, Requirement},
    auth::{PgTokensRepository, TokenAuthority, TokenService, TokensRepository},
    database::{self, PoolSettings},
    domain::{
        movies::{MovieCatalog, MoviesRepository, MoviesService, PgMoviesRepository},
        users::{PgUsersRepository, UserDirectory, UsersRepository, UsersService},
    },
    identity::IdentityResolver,
    memory::MemoryStore,
    notifications::{Dispatcher, Notifier},
    permissions::{PermissionsRepository, PgPermissionsRepository},
    rate_limit::{RateLimiter, RateLimiterSettings},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply database migrations")]
    Migrations(#[source] sqlx::migrate::MigrateError),
}

/// The record stores the services are built on.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UsersRepository>,
    pub tokens: Arc<dyn TokensRepository>,
    pub permissions: Arc<dyn PermissionsRepository>,
    pub movies: Arc<dyn MoviesRepository>,
}

impl Stores {
    #[must_use]
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            users: Arc::new(PgUsersRepository::new(pool.clone())),
            tokens: Arc::new(PgTokensRepository::new(pool.clone())),
            permissions: Arc::new(PgPermissionsRepository::new(pool.clone())),
            movies: Arc::new(PgMoviesRepository::new(pool.clone())),
        }
    }

    #[must_use]
    pub fn memory(store: &Arc<MemoryStore>) -> Self {
        Self {
            users: store.clone(),
            tokens: store.clone(),
            permissions: store.clone(),
            movies: store.clone(),
        }
    }

    /// Connect to `PostgreSQL` and bring its schema up to date.
    ///
    /// # Errors
    ///
    /// Returns an error when connecting or migrating fails.
    pub async fn from_database_url(url: &str, pool_settings: PoolSettings) -> Result<Self, AppInitError> {
        let pool = database::connect_with(url, pool_settings)
            .await
            .map_err(AppInitError::Database)?;

        database::migrate(&pool)
            .await
            .map_err(AppInitError::Migrations)?;

        Ok(Self::postgres(&pool))
    }
}

#[derive(Clone)]
pub struct AppContext {
    pub users: Arc<dyn UsersService>,
    pub movies: Arc<dyn MoviesService>,
    pub tokens: Arc<dyn TokenService>,
    pub permissions: Arc<dyn PermissionsRepository>,
    pub identity: IdentityResolver,
    pub rate_limiter: Arc<RateLimiter>,
    pub dispatcher: Dispatcher,
}

impl AppContext {
    /// Wire every service over `stores`.
    #[must_use]
    pub fn new(stores: Stores, limiter: RateLimiterSettings, notifier: Arc<dyn Notifier>) -> Self {
        let tokens: Arc<dyn TokenService> = Arc::new(TokenAuthority::new(
            Arc::clone(&stores.tokens),
            Arc::clone(&stores.users),
        ));

        let dispatcher = Dispatcher::new(notifier);

        Self {
            users: Arc::new(UserDirectory::new(
                Arc::clone(&stores.users),
                Arc::clone(&stores.permissions),
                Arc::clone(&tokens),
                dispatcher.clone(),
            )),
            movies: Arc::new(MovieCatalog::new(Arc::clone(&stores.movies))),
            identity: IdentityResolver::new(Arc::clone(&tokens)),
            tokens,
            permissions: stores.permissions,
            rate_limiter: Arc::new(RateLimiter::new(limiter)),
            dispatcher,
        }
    }

    /// Stages every request passes: rate limiting, then identity resolution.
    #[must_use]
    pub fn admission_pipeline(&self) -> Pipeline {
        Pipeline::new()
            .then(RateLimitStage::new(Arc::clone(&self.rate_limiter)))
            .then(AuthenticateStage::new(self.identity.clone()))
    }

    /// Guard stages for a route with `requirement`.
    #[must_use]
    pub fn guards(&self, requirement: &Requirement) -> Pipeline {
        requirement.guards(&self.permissions)
    }
}
