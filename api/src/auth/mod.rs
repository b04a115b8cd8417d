pub mod claims;
pub mod extractors;
pub mod guards;
pub mod middleware;

pub use claims::{AuthUser, Claims};

use chrono::{Duration, Utc};
use db::models::user::Role;
use jsonwebtoken::{Header, encode};
use services::error::AppError;

use crate::state::JwtKeys;

/// Generates a JWT and its expiry timestamp (RFC 3339) for a given user.
pub fn generate_jwt(keys: &JwtKeys, user_id: i64, role: Role) -> Result<(String, String), AppError> {
    let expiry = Utc::now() + Duration::minutes(keys.duration_minutes);

    let claims = Claims {
        sub: user_id,
        role,
        exp: expiry.timestamp() as usize,
    };

    let token = encode(&Header::default(), &claims, &keys.encoding)
        .map_err(|e| AppError::internal(format!("Token encoding failed: {e}")))?;

    Ok((token, expiry.to_rfc3339()))
}
