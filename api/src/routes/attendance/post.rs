use axum::{Extension, extract::State};
use services::attendance::{RosterEntry, StartSession, StartedSession};

use super::common::{CheckInRequest, CheckInResponse, FinalizeRequest, StartSessionRequest};
use crate::auth::AuthUser;
use crate::response::{ApiResponse, ApiResult};
use crate::routes::common::{ValidJson, ValidPath};
use crate::state::AppState;

/// POST /attendance/sessions
///
/// Opens an attendance session for the class the calling teacher teaches
/// `subjectName` to. Every enrolled student starts absent and is notified.
///
/// ### Request Body
/// ```json
/// {
///   "branch": "CSE",
///   "semester": "III",
///   "subjectName": "Operating Systems",
///   "latitude": 12.9716,
///   "longitude": 77.5946
/// }
/// ```
///
/// ### Responses
///
/// - `201 Created`
/// ```json
/// {
///   "statusCode": 201,
///   "success": true,
///   "data": {
///     "attendanceId": 42,
///     "sessionStart": "2026-03-10T09:00:00Z",
///     "sessionEnd": "2026-03-10T09:03:00Z",
///     "students": [
///       { "studentId": 7, "regNo": "1RV23CS001", "name": "Asha", "status": "absent" }
///     ]
///   },
///   "message": "Attendance session started"
/// }
/// ```
///
/// - `400 Bad Request` (unknown branch or semester, coordinates out of bounds)
/// - `404 Not Found` (no class for this branch, semester and subject is assigned to the teacher)
pub async fn start_session(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    ValidJson(req): ValidJson<StartSessionRequest>,
) -> ApiResult<StartedSession> {
    let request = StartSession::try_from(req)?;
    let started = state.attendance().start_session(claims.sub, request).await?;
    Ok(ApiResponse::created(started, "Attendance session started"))
}

/// POST /attendance/sessions/{id}/check-in
///
/// Marks the calling student present when their position is inside the
/// geofence around the teacher. Repeat check-ins succeed.
///
/// ### Request Body
/// ```json
/// { "latitude": 12.9717, "longitude": 77.5947 }
/// ```
///
/// ### Responses
///
/// - `200 OK`
/// ```json
/// {
///   "statusCode": 200,
///   "success": true,
///   "data": { "success": true },
///   "message": "Attendance marked"
/// }
/// ```
///
/// - `403 Forbidden` (`"You are too far away from the class location"`)
/// - `404 Not Found` (session closed, unknown, or the student is not on its roster)
pub async fn check_in(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    ValidPath(attendance_id): ValidPath<i64>,
    ValidJson(req): ValidJson<CheckInRequest>,
) -> ApiResult<CheckInResponse> {
    state
        .attendance()
        .check_in(claims.sub, attendance_id, req.latitude, req.longitude)
        .await?;
    Ok(ApiResponse::success(CheckInResponse { success: true }, "Attendance marked"))
}

/// POST /attendance/sessions/{id}/finalize
///
/// Closes the session. Optional overrides are applied on top of the
/// check-ins, the final statuses are stored and each student is told
/// whether they were marked present.
///
/// ### Request Body
/// ```json
/// {
///   "records": [
///     { "studentId": 8, "status": "present" }
///   ]
/// }
/// ```
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
///     { "studentId": 8, "regNo": "1RV23CS002", "name": "Ravi", "status": "present" }
///   ],
///   "message": "Attendance finalized"
/// }
/// ```
///
/// - `403 Forbidden` (session belongs to another teacher)
/// - `404 Not Found` (session unknown or already finalized)
pub async fn finalize_session(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    ValidPath(attendance_id): ValidPath<i64>,
    ValidJson(req): ValidJson<FinalizeRequest>,
) -> ApiResult<Vec<RosterEntry>> {
    let roster = state
        .attendance()
        .finalize(claims.sub, attendance_id, req.records)
        .await?;
    Ok(ApiResponse::success(roster, "Attendance finalized"))
}
