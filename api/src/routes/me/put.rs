use axum::{Extension, extract::State};
use serde::Deserialize;
use services::profile;
use validator::Validate;

use crate::auth::AuthUser;
use crate::response::{ApiResponse, ApiResult};
use crate::routes::common::ValidJson;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct DeviceTokenRequest {
    /// `null` or blank clears the stored token.
    #[validate(length(max = 4096, message = "Device token is too long"))]
    pub token: Option<String>,
}

/// PUT /me/device-token
///
/// Registers the push token of the caller's device. Sending `null` or an
/// empty string unregisters it.
///
/// ### Request Body
/// ```json
/// { "token": "fcm-device-token" }
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
///   "message": "Device token updated"
/// }
/// ```
pub async fn put_device_token(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    ValidJson(req): ValidJson<DeviceTokenRequest>,
) -> ApiResult<()> {
    profile::set_device_token(state.db(), claims.sub, req.token.as_deref()).await?;
    Ok(ApiResponse::maybe(None, "Device token updated"))
}
