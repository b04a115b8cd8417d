use axum::{Extension, extract::State};
use services::attendance::{ActiveSession, RosterEntry};

use crate::auth::AuthUser;
use crate::response::{ApiResponse, ApiResult};
use crate::routes::common::ValidPath;
use crate::state::AppState;

/// GET /attendance/sessions/{id}/roster
///
/// Live view of an open session: every student on the roster with their
/// current status.
///
/// ### Responses
///
/// - `200 OK`
/// ```json
/// {
///   "statusCode": 200,
///   "success": true,
///   "data": [
///     { "studentId": 7, "regNo": "1RV23CS001", "name": "Asha", "status": "present" },
///     { "studentId": 8, "regNo": "1RV23CS002", "name": "Ravi", "status": "absent" }
///   ],
///   "message": "Roster retrieved successfully"
/// }
/// ```
///
/// - `403 Forbidden` (session belongs to another teacher)
/// - `404 Not Found` (session unknown or already finalized)
pub async fn get_roster(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    ValidPath(attendance_id): ValidPath<i64>,
) -> ApiResult<Vec<RosterEntry>> {
    let roster = state.attendance().roster(claims.sub, attendance_id).await?;
    Ok(ApiResponse::success(roster, "Roster retrieved successfully"))
}

/// GET /attendance/active
///
/// The most recent session of the student's class that is still running and
/// in which they have not checked in yet. `data` is `null` when there is none.
///
/// ### Responses
///
/// - `200 OK`
/// ```json
/// {
///   "statusCode": 200,
///   "success": true,
///   "data": {
///     "attendanceId": 42,
///     "teacherName": "Prof. Rao",
///     "branch": "CSE",
///     "semester": "III",
///     "subjectName": "Operating Systems",
///     "endsAt": "10 March 2026, 09:03:00 AM UTC"
///   },
///   "message": "Active attendance session found"
/// }
/// ```
pub async fn get_active_session(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> ApiResult<ActiveSession> {
    let active = state.attendance().active_session(claims.sub).await?;
    let message = if active.is_some() {
        "Active attendance session found"
    } else {
        "No active attendance session found"
    };
    Ok(ApiResponse::maybe(active, message))
}
