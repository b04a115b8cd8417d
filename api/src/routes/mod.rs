//! HTTP route entry point for `/api/...`.
//!
//! Routes are organized by audience, each protected by the matching guard:
//! - `/health` → Health check endpoint (public)
//! - `/auth` → OTP login (public) and token verification (authenticated)
//! - `/me` → Profile, device token and notification inbox (authenticated)
//! - `/attendance` → Session lifecycle (teacher or student, per route)
//! - `/teacher` → Subjects, logs, analytics and export (teachers)
//! - `/student` → Subject summaries and logs (students)

use axum::{Router, middleware::from_fn_with_state};

use crate::auth::guards::{allow_authenticated, allow_student, allow_teacher};
use crate::routes::{
    attendance::attendance_routes, auth::auth_routes, health::health_routes, me::me_routes,
    student::student_routes, teacher::teacher_routes,
};
use crate::state::AppState;

pub mod attendance;
pub mod auth;
pub mod common;
pub mod health;
pub mod me;
pub mod student;
pub mod teacher;

/// Builds the complete application router for all HTTP endpoints.
///
/// The returned router has `AppState` as its state type and is nested under
/// `/api` by `main`.
pub fn routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/health", health_routes())
        .nest("/auth", auth_routes(app_state.clone()))
        .nest(
            "/me",
            me_routes().route_layer(from_fn_with_state(app_state.clone(), allow_authenticated)),
        )
        .nest("/attendance", attendance_routes(app_state.clone()))
        .nest(
            "/teacher",
            teacher_routes().route_layer(from_fn_with_state(app_state.clone(), allow_teacher)),
        )
        .nest(
            "/student",
            student_routes().route_layer(from_fn_with_state(app_state, allow_student)),
        )
}
