//! Movies

pub mod data;
pub mod errors;
pub mod records;
mod repository;
pub mod service;

pub use errors::MoviesServiceError;
pub use repository::{MoviesRepository, PgMoviesRepository};
pub use service::*;
