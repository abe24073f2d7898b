//! Token Handlers

pub(crate) mod authentication;
