use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use services::error::AppError;

/// Standardized API response wrapper for all outgoing JSON responses.
///
/// Every endpoint answers with the same envelope, and the HTTP status always
/// mirrors `statusCode`:
/// ```json
/// {
///   "statusCode": 200,
///   "success": true,
///   "data": { ... },
///   "message": "Some message"
/// }
/// ```
///
/// Failures carry `"data": null`:
/// ```json
/// {
///   "statusCode": 404,
///   "success": false,
///   "data": null,
///   "message": "Attendance session not found or already closed"
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub success: bool,
    pub data: Option<T>,
    pub message: String,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    /// `200 OK` with a payload.
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::OK, Some(data), message)
    }

    /// `201 Created` with a payload.
    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::CREATED, Some(data), message)
    }

    /// `200 OK` where "nothing" is a valid answer rather than an error.
    pub fn maybe(data: Option<T>, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::OK, data, message)
    }

    pub fn with_status(status: StatusCode, data: Option<T>, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            success: status.is_success(),
            data,
            message: message.into(),
        }
    }
}

impl ApiResponse<()> {
    /// Failure envelope with `data: null`.
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self::with_status(status, None, message)
    }
}

impl<T> IntoResponse for ApiResponse<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// HTTP boundary for [`AppError`]: the only place failures become envelopes.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        }
        ApiResponse::error(status, self.0.to_string()).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn success_envelope() {
        let response = ApiResponse::created(5, "made").into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        assert_eq!(json["statusCode"], 201);
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], 5);
        assert_eq!(json["message"], "made");
    }

    #[tokio::test]
    async fn error_envelope_has_null_data_and_mirrored_status() {
        let response = ApiError(AppError::OutOfRange).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let json = body_json(response).await;
        assert_eq!(json["statusCode"], 403);
        assert_eq!(json["success"], false);
        assert!(json["data"].is_null());
        assert!(json["message"].as_str().unwrap().contains("too far away"));
    }
}
