use clap::{Parser, Subcommand};
use greenlight_app::database;
use sqlx::PgPool;

mod db;
mod permissions;
mod tokens;

#[derive(Debug, Parser)]
#[command(name = "greenlight-app", about = "Greenlight operator CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Permissions(permissions::PermissionsCommand),
    Tokens(tokens::TokensCommand),
    Db(db::DbCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Permissions(command) => permissions::run(command).await,
            Commands::Tokens(command) => tokens::run(command).await,
            Commands::Db(command) => db::run(command).await,
        }
    }
}

async fn connect(database_url: &str) -> Result<PgPool, String> {
    database::connect(database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))
}
