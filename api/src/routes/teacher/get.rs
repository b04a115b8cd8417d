use axum::{
    Extension,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use services::reporting::{self, SemesterSubjects, StudentAnalytics, TeacherLog};
use validator::Validate;

use crate::auth::AuthUser;
use crate::response::{ApiError, ApiResponse, ApiResult};
use crate::routes::common::ValidQuery;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsQuery {
    pub subject_id: i64,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExportQuery {
    pub subject_id: i64,

    #[validate(range(min = 1, max = 12, message = "Month must be between 1 and 12"))]
    pub month: Option<u32>,

    #[validate(range(min = 1970, max = 9999, message = "Year is out of range"))]
    pub year: Option<i32>,
}

/// GET /teacher/subjects
///
/// Subjects the caller teaches, grouped by semester in academic order.
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
///       "semester": "Sem III",
///       "subjects": [{ "name": "Operating Systems", "code": "CS301", "branch": "CSE" }]
///     }
///   ],
///   "message": "Subjects retrieved successfully"
/// }
/// ```
pub async fn get_subjects(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> ApiResult<Vec<SemesterSubjects>> {
    let subjects = reporting::teacher_subjects(state.db(), claims.sub).await?;
    Ok(ApiResponse::success(subjects, "Subjects retrieved successfully"))
}

/// GET /teacher/logs
///
/// Every session the caller has taken, newest first.
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
///       "attendanceId": 42,
///       "subject": "Operating Systems",
///       "branch": "CSE",
///       "semester": "III",
///       "total": 3,
///       "present": 1,
///       "absent": 2,
///       "time": "09:00:00",
///       "date": "2026-03-10"
///     }
///   ],
///   "message": "Attendance logs retrieved successfully"
/// }
/// ```
pub async fn get_logs(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> ApiResult<Vec<TeacherLog>> {
    let logs = reporting::teacher_logs(state.db(), claims.sub).await?;
    Ok(ApiResponse::success(logs, "Attendance logs retrieved successfully"))
}

/// GET /teacher/analytics/students?subjectId=3
///
/// Attendance totals of every student the caller teaches the subject to,
/// ordered by registration number.
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
///       "studentId": 7,
///       "regNo": "1RV23CS001",
///       "name": "Asha",
///       "total": 4,
///       "present": 3,
///       "percentage": 75.0
///     }
///   ],
///   "message": "Student analytics retrieved successfully"
/// }
/// ```
///
/// - `400 Bad Request` (missing or non-numeric `subjectId`)
/// - `404 Not Found` (the subject is not assigned to the caller)
pub async fn get_student_analytics(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    ValidQuery(query): ValidQuery<AnalyticsQuery>,
) -> ApiResult<Vec<StudentAnalytics>> {
    let analytics = reporting::student_analytics(state.db(), claims.sub, query.subject_id).await?;
    Ok(ApiResponse::success(analytics, "Student analytics retrieved successfully"))
}

/// GET /teacher/attendance/export?subjectId=3&month=3&year=2026
///
/// Downloads the attendance sheet of a subject as CSV. `month` and `year`
/// narrow the sessions included; omitted, every session is exported.
///
/// ### Responses
///
/// - `200 OK` with `Content-Type: text/csv` and an attachment filename such
///   as `CS301_attendance_2026-03.csv`
/// ```text
/// Reg No,Name,2026-03-10 09:00,Total,Present,Percentage
/// 1RV23CS001,Asha,P,1,1,100.00
/// ```
///
/// - `400 Bad Request` (month outside 1..=12)
/// - `404 Not Found` (the subject is not assigned to the caller)
pub async fn export_attendance(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    ValidQuery(query): ValidQuery<ExportQuery>,
) -> Result<Response, ApiError> {
    let export = reporting::export_csv(
        state.db(),
        claims.sub,
        query.subject_id,
        query.month,
        query.year,
    )
    .await?;

    tracing::info!(
        teacher_id = claims.sub,
        subject_id = query.subject_id,
        filename = %export.filename,
        "Attendance exported"
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export.filename),
            ),
        ],
        export.content,
    )
        .into_response())
}
