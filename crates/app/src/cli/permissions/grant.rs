use clap::Args;
use greenlight_app::{
    domain::users::{PgUsersRepository, UsersRepository},
    permissions::{PermissionCode, PermissionsRepository, PgPermissionsRepository},
};

#[derive(Debug, Args)]
pub(crate) struct GrantPermissionArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// E-mail address of the user to grant to
    #[arg(long)]
    email: String,

    /// Permission code, e.g. `movies:write`; repeat for several
    #[arg(long = "code", required = true)]
    codes: Vec<String>,
}

pub(crate) async fn run(args: GrantPermissionArgs) -> Result<(), String> {
    let pool = crate::cli::connect(&args.database_url).await?;

    let user = PgUsersRepository::new(pool.clone())
        .get_user_by_email(&args.email)
        .await
        .map_err(|error| format!("failed to find user {}: {error}", args.email))?;

    let codes: Vec<PermissionCode> = args.codes.into_iter().map(PermissionCode::new).collect();

    let granted = PgPermissionsRepository::new(pool)
        .grant_permissions(user.id, &codes)
        .await
        .map_err(|error| format!("failed to grant permissions: {error}"))?;

    println!("granted {granted} new permission(s) to user {}", user.id);

    if u64::try_from(codes.len()).is_ok_and(|requested| granted < requested) {
        println!("unknown or already held codes were skipped");
    }

    Ok(())
}
