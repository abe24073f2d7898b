//! Per-user capability codes.

mod models;
mod repository;

pub use models::*;
pub use repository::{PermissionsRepository, PgPermissionsRepository};
