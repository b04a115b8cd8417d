//! # auth Routes Module
//!
//! This module defines and wires up routes for the `/auth` endpoint group.
//!
//! ## Structure
//! - `post.rs`: POST handlers (OTP send and verify)
//! - `get.rs`: GET handlers (token verification)
//!
//! ## Usage
//! The `auth_routes()` function returns a `Router` which is nested under `/auth` in the main application.

pub mod get;
pub mod post;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};

use crate::auth::guards::allow_authenticated;
use crate::state::AppState;
use get::verify_token;
use post::{send_otp, verify_otp};

/// Builds the `/auth` route group, mapping HTTP methods to handlers.
///
/// - `POST /auth/otp/send` → `send_otp`
/// - `POST /auth/otp/verify` → `verify_otp`
/// - `GET /auth/verify` → `verify_token` (any authenticated user)
///
/// # Returns
/// A configured `Router` instance to be nested in the main app.
pub fn auth_routes(app_state: AppState) -> Router<AppState> {
    let verify = Router::new()
        .route("/verify", get(verify_token))
        .route_layer(from_fn_with_state(app_state, allow_authenticated));

    Router::new()
        .route("/otp/send", post(send_otp))
        .route("/otp/verify", post(verify_otp))
        .merge(verify)
}
