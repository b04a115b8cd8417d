use axum::{Extension, extract::State};
use chrono::Utc;
use services::{
    notifications::{self, NotificationGroup},
    profile::{self, Profile},
};

use crate::auth::AuthUser;
use crate::response::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /me
///
/// Returns the caller's profile. Teachers get their staff id number,
/// students their registration number, year and class.
///
/// ### Responses
///
/// - `200 OK` (student)
/// ```json
/// {
///   "statusCode": 200,
///   "success": true,
///   "data": {
///     "id": 7,
///     "name": "Asha",
///     "email": "asha@college.edu",
///     "department": "CSE",
///     "role": "student",
///     "gender": "female",
///     "regNo": "1RV23CS001",
///     "year": 2,
///     "class": { "id": 1, "code": "CSE-III", "branch": "CSE", "semester": "III" }
///   },
///   "message": "Profile retrieved successfully"
/// }
/// ```
///
/// - `404 Not Found` (user no longer exists)
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> ApiResult<Profile> {
    let profile = profile::profile(state.db(), claims.sub).await?;
    Ok(ApiResponse::success(profile, "Profile retrieved successfully"))
}

/// GET /me/notifications
///
/// The caller's in-app notifications, newest first, grouped into
/// `Today`, `Yesterday` or a `Weekday, Month Day` label.
///
/// ### Responses
///
/// - `200 OK`
/// ```json
/// {
///   "statusCode": 200,
///   "success": true,
///   "data": [
///     { "date": "Today", "items": ["Attendance for Operating Systems has been started"] },
///     { "date": "Monday, March 2", "items": ["You have been successfully marked present for subject Operating Systems on 2026-03-02"] }
///   ],
///   "message": "Notifications retrieved successfully"
/// }
/// ```
pub async fn get_notifications(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> ApiResult<Vec<NotificationGroup>> {
    let groups = notifications::inbox(state.db(), claims.sub, Utc::now()).await?;
    Ok(ApiResponse::success(groups, "Notifications retrieved successfully"))
}
