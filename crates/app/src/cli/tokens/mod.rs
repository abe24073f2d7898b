use clap::{Args, Subcommand};

mod revoke;

#[derive(Debug, Args)]
pub(crate) struct TokensCommand {
    #[command(subcommand)]
    command: TokensSubcommand,
}

#[derive(Debug, Subcommand)]
enum TokensSubcommand {
    Revoke(revoke::RevokeTokensArgs),
}

pub(crate) async fn run(command: TokensCommand) -> Result<(), String> {
    match command.command {
        TokensSubcommand::Revoke(args) => revoke::run(args).await,
    }
}
