//! Users

pub mod data;
pub mod errors;
pub mod password;
pub mod records;
mod repository;
pub mod service;

pub use errors::UsersServiceError;
pub use repository::{PgUsersRepository, UsersRepository};
pub use service::*;
