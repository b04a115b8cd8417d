//! Domain services for the attendance backend.
//!
//! Handlers in the `api` crate stay thin: they authenticate, parse and
//! validate, then call into one of the services here. Every service returns
//! [`error::AppError`], which the HTTP layer maps into the response envelope.

pub mod attendance;
pub mod auth;
pub mod error;
pub mod mailer;
pub mod notifications;
pub mod profile;
pub mod push;
pub mod reporting;
pub mod session_store;
