//! # attendance Routes Module
//!
//! Session lifecycle endpoints, nested under `/attendance`.
//!
//! Teachers open, preview and finalize sessions; students check in and ask
//! whether a session is waiting for them. Each half of the group carries
//! its own role guard.
//!
//! ## Structure
//! - `post.rs`: start, check-in, finalize
//! - `get.rs`: roster preview, active session lookup
//! - `common.rs`: request DTOs

pub mod common;
pub mod get;
pub mod post;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};

use crate::auth::guards::{allow_student, allow_teacher};
use crate::state::AppState;
use get::{get_active_session, get_roster};
use post::{check_in, finalize_session, start_session};

/// Builds the `/attendance` route group.
///
/// - `POST /attendance/sessions` → `start_session` (teacher)
/// - `GET /attendance/sessions/{id}/roster` → `get_roster` (teacher)
/// - `POST /attendance/sessions/{id}/finalize` → `finalize_session` (teacher)
/// - `POST /attendance/sessions/{id}/check-in` → `check_in` (student)
/// - `GET /attendance/active` → `get_active_session` (student)
pub fn attendance_routes(app_state: AppState) -> Router<AppState> {
    let teacher = Router::new()
        .route("/sessions", post(start_session))
        .route("/sessions/{id}/roster", get(get_roster))
        .route("/sessions/{id}/finalize", post(finalize_session))
        .route_layer(from_fn_with_state(app_state.clone(), allow_teacher));

    let student = Router::new()
        .route("/sessions/{id}/check-in", post(check_in))
        .route("/active", get(get_active_session))
        .route_layer(from_fn_with_state(app_state, allow_student));

    teacher.merge(student)
}
