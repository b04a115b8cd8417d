use axum::extract::State;
use db::models::user::Role;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::generate_jwt;
use crate::response::{ApiResponse, ApiResult};
use crate::routes::common::ValidJson;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct SendOtpRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct VerifyOtpRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(equal = 6, message = "OTP must be 6 digits"))]
    pub otp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    pub role: Role,
    pub expires_at: String,
}

/// POST /auth/otp/send
///
/// Emails a one-time login code to a registered user.
///
/// ### Request Body
/// ```json
/// { "email": "rao@college.edu" }
/// ```
///
/// ### Responses
///
/// - `200 OK`
/// ```json
/// {
///   "statusCode": 200,
///   "success": true,
///   "data": null,
///   "message": "OTP sent to your email"
/// }
/// ```
///
/// - `400 Bad Request` (malformed email)
/// - `404 Not Found` (no user with this email)
/// - `500 Internal Server Error` (mail delivery failed)
pub async fn send_otp(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<SendOtpRequest>,
) -> ApiResult<()> {
    state.otp().send_otp(&req.email).await?;
    Ok(ApiResponse::maybe(None, "OTP sent to your email"))
}

/// POST /auth/otp/verify
///
/// Exchanges a valid OTP for a signed token. The OTP is single use.
///
/// ### Request Body
/// ```json
/// { "email": "rao@college.edu", "otp": "482913" }
/// ```
///
/// ### Responses
///
/// - `200 OK`
/// ```json
/// {
///   "statusCode": 200,
///   "success": true,
///   "data": {
///     "token": "jwt_token_here",
///     "role": "teacher",
///     "expiresAt": "2026-03-10T09:00:00+00:00"
///   },
///   "message": "Login successful"
/// }
/// ```
///
/// - `400 Bad Request` (wrong or expired OTP)
/// - `404 Not Found` (no user with this email)
pub async fn verify_otp(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<VerifyOtpRequest>,
) -> ApiResult<TokenResponse> {
    let user = state.otp().verify_otp(&req.email, &req.otp).await?;
    let (token, expires_at) = generate_jwt(state.jwt(), user.id, user.role)?;

    tracing::info!(user_id = user.id, role = %user.role, "User logged in");

    Ok(ApiResponse::success(
        TokenResponse {
            token,
            role: user.role,
            expires_at,
        },
        "Login successful",
    ))
}
