//! Token authority: issues, resolves and revokes scoped bearer tokens.

mod errors;
mod models;
mod repository;
mod service;
mod token;

pub use errors::*;
pub use models::*;
pub use repository::{PgTokensRepository, TokensRepository};
pub use service::*;
pub use token::*;
