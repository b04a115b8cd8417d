//! # teacher Routes Module
//!
//! Read-only reporting for teachers, nested under `/teacher` behind `allow_teacher`.
//!
//! - `GET /teacher/subjects` → `get_subjects`
//! - `GET /teacher/logs` → `get_logs`
//! - `GET /teacher/analytics/students?subjectId=` → `get_student_analytics`
//! - `GET /teacher/attendance/export?subjectId=&month=&year=` → `export_attendance`

pub mod get;

use axum::{Router, routing::get};

use crate::state::AppState;
use get::{export_attendance, get_logs, get_student_analytics, get_subjects};

pub fn teacher_routes() -> Router<AppState> {
    Router::new()
        .route("/subjects", get(get_subjects))
        .route("/logs", get(get_logs))
        .route("/analytics/students", get(get_student_analytics))
        .route("/attendance/export", get(export_attendance))
}
