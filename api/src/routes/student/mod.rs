//! # student Routes Module
//!
//! Attendance history for students, nested under `/student` behind `allow_student`.
//!
//! - `GET /student/subjects` → `get_subjects`
//! - `GET /student/subjects/monthly?month=&year=` → `get_monthly`
//! - `GET /student/logs` → `get_logs`

pub mod get;

use axum::{Router, routing::get};

use crate::state::AppState;
use get::{get_logs, get_monthly, get_subjects};

pub fn student_routes() -> Router<AppState> {
    Router::new()
        .route("/subjects", get(get_subjects))
        .route("/subjects/monthly", get(get_monthly))
        .route("/logs", get(get_logs))
}
