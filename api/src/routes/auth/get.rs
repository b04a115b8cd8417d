use axum::{Extension, extract::State};
use services::profile::{self, UserSummary};

use crate::auth::AuthUser;
use crate::response::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /auth/verify
///
/// Resolves the bearer token to the user it was issued for.
///
/// ### Responses
///
/// - `200 OK`
/// ```json
/// {
///   "statusCode": 200,
///   "success": true,
///   "data": {
///     "id": 1,
///     "name": "Prof. Rao",
///     "email": "rao@college.edu",
///     "department": "CSE",
///     "role": "teacher",
///     "gender": "male"
///   },
///   "message": "Token is valid"
/// }
/// ```
///
/// - `401 Unauthorized` (missing, invalid or expired token)
/// - `404 Not Found` (user no longer exists)
pub async fn verify_token(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> ApiResult<UserSummary> {
    let user = profile::summary(state.db(), claims.sub).await?;
    Ok(ApiResponse::success(user, "Token is valid"))
}
