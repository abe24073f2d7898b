//! Request admission at the HTTP boundary.
//!
//! [`admit`] runs the shared admission pipeline (rate limiting, then identity) for
//! every request and leaves the resulting [`Admission`] in the depot. Routes that
//! demand more of the caller add a [`Require`] hoop, which runs the matching guards
//! over that same admission.
//!
//! [`Admission`]: greenlight_app::admission::Admission

mod client;
mod errors;
mod guard;
mod middleware;

pub(crate) use guard::Require;
pub(crate) use middleware::admit;
