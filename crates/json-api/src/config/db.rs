//! Database Config

use std::time::Duration;

use clap::Args;

use greenlight_app::database::PoolSettings;

/// Database settings.
#[derive(Debug, Args)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection string. Records are kept in memory when unset.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Maximum open connections in the pool
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 25)]
    pub db_max_connections: u32,

    /// Seconds an idle connection is kept before being closed
    #[arg(long, env = "DB_MAX_IDLE_TIME_SECONDS", default_value_t = 900)]
    pub db_max_idle_time_seconds: u64,
}

impl DatabaseConfig {
    #[must_use]
    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            max_connections: self.db_max_connections,
            max_idle_time: Duration::from_secs(self.db_max_idle_time_seconds),
        }
    }
}
