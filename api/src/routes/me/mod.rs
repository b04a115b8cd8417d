//! # me Routes Module
//!
//! Routes about the caller themselves, nested under `/me` behind
//! `allow_authenticated`.
//!
//! - `GET /me` → `get_profile`
//! - `PUT /me/device-token` → `put_device_token`
//! - `GET /me/notifications` → `get_notifications`

pub mod get;
pub mod put;

use axum::{
    Router,
    routing::{get, put},
};

use crate::state::AppState;
use get::{get_notifications, get_profile};
use put::put_device_token;

pub fn me_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_profile))
        .route("/device-token", put(put_device_token))
        .route("/notifications", get(get_notifications))
}
