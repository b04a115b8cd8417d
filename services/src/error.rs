use sea_orm::DbErr;
use thiserror::Error;

/// Failure taxonomy shared by every service.
///
/// Mapped exactly once into an HTTP status and the JSON envelope by the `api` crate.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// Check-in rejected by the geofence.
    #[error("You are too far away from the class location")]
    OutOfRange,

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        AppError::InvalidInput(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        AppError::Forbidden(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    /// HTTP status code carried in the envelope.
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::InvalidInput(_) => 400,
            AppError::Unauthorized(_) => 401,
            AppError::Forbidden(_) | AppError::OutOfRange => 403,
            AppError::NotFound(_) => 404,
            AppError::Internal(_) => 500,
        }
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::RecordNotFound(msg) => AppError::NotFound(msg),
            other => {
                tracing::error!(error = %other, "Database error");
                AppError::Internal("Database error".into())
            }
        }
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        tracing::error!(error = %err, "Session cache error");
        AppError::Internal("Session cache unavailable".into())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!(error = %err, "Corrupt cached session");
        AppError::Internal("Corrupt session data".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(AppError::invalid("x").status_code(), 400);
        assert_eq!(AppError::Unauthorized("x".into()).status_code(), 401);
        assert_eq!(AppError::forbidden("x").status_code(), 403);
        assert_eq!(AppError::not_found("x").status_code(), 404);
        assert_eq!(AppError::OutOfRange.status_code(), 403);
        assert_eq!(AppError::internal("x").status_code(), 500);
    }

    #[test]
    fn out_of_range_has_distinct_message() {
        assert!(AppError::OutOfRange.to_string().contains("too far away"));
    }

    #[test]
    fn record_not_found_maps_to_not_found() {
        let err: AppError = DbErr::RecordNotFound("gone".into()).into();
        assert!(matches!(err, AppError::NotFound(m) if m == "gone"));
    }
}
