//! Extractors and helpers shared by every route group.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
};
use db::models::{class::Semester, user::Department};
use serde::de::DeserializeOwned;
use services::error::AppError;
use validator::{Validate, ValidationErrors};

use crate::response::ApiError;

/// Joins every field message into one `; `-separated string.
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| {
            errs.iter()
                .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn validate<T: Validate>(value: &T) -> Result<(), ApiError> {
    value
        .validate()
        .map_err(|e| ApiError(AppError::invalid(format_validation_errors(&e))))
}

/// JSON body that is deserialized and then validated.
///
/// Malformed bodies and validation failures both become `400` envelopes.
pub struct ValidJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError(AppError::invalid(e.body_text())))?;
        validate(&value)?;
        Ok(ValidJson(value))
    }
}

/// Query string counterpart of [`ValidJson`].
pub struct ValidQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError(AppError::invalid(e.body_text())))?;
        validate(&value)?;
        Ok(ValidQuery(value))
    }
}

/// Path parameters whose parse failures still produce the JSON envelope.
pub struct ValidPath<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError(AppError::invalid(e.body_text())))?;
        Ok(ValidPath(value))
    }
}

pub fn parse_branch(raw: &str) -> Result<Department, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::invalid(format!("Unknown branch '{}'", raw.trim())))
}

/// Accepts roman numerals (`III`) or plain numbers (`3`).
pub fn parse_semester(raw: &str) -> Result<Semester, AppError> {
    let raw = raw.trim();
    let parsed = match raw.parse::<u8>() {
        Ok(n) => Semester::from_number(n),
        Err(_) => raw.parse().ok(),
    };
    parsed.ok_or_else(|| AppError::invalid(format!("Unknown semester '{raw}'")))
}
