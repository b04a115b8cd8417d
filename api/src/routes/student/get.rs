use axum::{Extension, extract::State};
use serde::Deserialize;
use services::reporting::{self, MonthlySubjectStats, StudentLog, SubjectSummary};
use validator::Validate;

use crate::auth::AuthUser;
use crate::response::{ApiResponse, ApiResult};
use crate::routes::common::ValidQuery;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct MonthlyQuery {
    #[validate(range(min = 1, max = 12, message = "Month must be between 1 and 12"))]
    pub month: u32,

    #[validate(range(min = 1970, max = 9999, message = "Year is out of range"))]
    pub year: i32,
}

/// GET /student/subjects
///
/// Per-subject totals over every session the caller was on the roster for.
///
/// ### Responses
///
/// - `200 OK`
/// ```json
/// {
///   "statusCode": 200,
///   "success": true,
///   "data": [
///     {
///       "id": 3,
///       "name": "Operating Systems",
///       "code": "CS301",
///       "professor": "Prof. Rao",
///       "total": 4,
///       "present": 3
///     }
///   ],
///   "message": "Subjects retrieved successfully"
/// }
/// ```
pub async fn get_subjects(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> ApiResult<Vec<SubjectSummary>> {
    let subjects = reporting::student_subjects(state.db(), claims.sub).await?;
    Ok(ApiResponse::success(subjects, "Subjects retrieved successfully"))
}

/// GET /student/subjects/monthly?month=3&year=2026
///
/// Per-subject statistics restricted to one calendar month.
///
/// ### Responses
///
/// - `200 OK`
/// ```json
/// {
///   "statusCode": 200,
///   "success": true,
///   "data": [
///     { "subject": "Operating Systems", "code": "CS301", "total": 2, "present": 1, "percentage": 50.0 }
///   ],
///   "message": "Monthly statistics retrieved successfully"
/// }
/// ```
///
/// - `400 Bad Request` (missing `month`/`year`, or month outside 1..=12)
pub async fn get_monthly(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    ValidQuery(query): ValidQuery<MonthlyQuery>,
) -> ApiResult<Vec<MonthlySubjectStats>> {
    let stats = reporting::student_monthly(state.db(), claims.sub, query.month, query.year).await?;
    Ok(ApiResponse::success(stats, "Monthly statistics retrieved successfully"))
}

/// GET /student/logs
///
/// The caller's check-in history, newest first.
///
/// ### Responses
///
/// - `200 OK`
/// ```json
/// {
///   "statusCode": 200,
///   "success": true,
///   "data": [
///     { "subject": "Operating Systems", "status": "SUCCESS", "time": "09:00:00", "date": "2026-03-10" }
///   ],
///   "message": "Attendance logs retrieved successfully"
/// }
/// ```
pub async fn get_logs(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> ApiResult<Vec<StudentLog>> {
    let logs = reporting::student_logs(state.db(), claims.sub).await?;
    Ok(ApiResponse::success(logs, "Attendance logs retrieved successfully"))
}
