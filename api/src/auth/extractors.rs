use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use jsonwebtoken::{Algorithm, Validation, decode};
use services::error::AppError;

use crate::auth::claims::{AuthUser, Claims};
use crate::response::ApiError;
use crate::state::{AppState, JwtKeys};

/// Verifies a bearer token and returns its claims.
pub fn decode_token(keys: &JwtKeys, token: &str) -> Result<Claims, AppError> {
    decode::<Claims>(token, &keys.decoding, &Validation::new(Algorithm::HS256))
        .map(|data| data.claims)
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))
}

/// Extracts `AuthUser` from the `Authorization: Bearer` header.
///
/// A guard may already have verified the token and stored the result in the
/// request extensions; that value is reused when present.
///
/// # Errors
/// - `401 Unauthorized` if the header is missing or malformed, or the token is invalid or expired.
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    ApiError(AppError::Unauthorized(
                        "Missing or invalid Authorization header".into(),
                    ))
                })?;

        let claims = decode_token(state.jwt(), bearer.token())?;
        Ok(AuthUser(claims))
    }
}
