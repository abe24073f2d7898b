use clap::Args;
use greenlight_app::{
    auth::{PgTokensRepository, TokenScope, TokensRepository},
    domain::users::{PgUsersRepository, UsersRepository},
};

#[derive(Debug, Args)]
pub(crate) struct RevokeTokensArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// E-mail address of the token owner
    #[arg(long)]
    email: String,

    /// Token scope to revoke: `activation` or `authentication`
    #[arg(long)]
    scope: TokenScope,
}

pub(crate) async fn run(args: RevokeTokensArgs) -> Result<(), String> {
    let pool = crate::cli::connect(&args.database_url).await?;

    let user = PgUsersRepository::new(pool.clone())
        .get_user_by_email(&args.email)
        .await
        .map_err(|error| format!("failed to find user {}: {error}", args.email))?;

    let revoked = PgTokensRepository::new(pool)
        .delete_tokens_for_user(args.scope, user.id)
        .await
        .map_err(|error| format!("failed to revoke tokens: {error}"))?;

    println!("revoked {revoked} {} token(s) for user {}", args.scope, user.id);

    Ok(())
}
