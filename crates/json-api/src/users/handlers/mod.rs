//! User Handlers

pub(crate) mod activate;
pub(crate) mod register;
