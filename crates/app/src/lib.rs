//! Greenlight request admission, identity and record services.

pub mod admission;
pub mod auth;
pub mod context;
pub mod database;
pub mod domain;
pub mod identity;
pub mod ids;
pub mod memory;
pub mod notifications;
pub mod permissions;
pub mod rate_limit;
pub mod store;
pub mod validator;
pub mod versioning;

#[cfg(test)]
mod test;
