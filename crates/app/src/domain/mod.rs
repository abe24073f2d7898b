//! Greenlight Domain Concerns

pub mod movies;
pub mod users;
