use axum::{Router, routing::get};
use serde::Serialize;
use util::config;

use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub service: String,
    pub version: &'static str,
}

/// `GET /health`, for uptime checks and load balancers.
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/", get(health_check))
}

/// GET /health
///
/// ### Response
/// - `200 OK`
///
/// ```json
/// {
///   "statusCode": 200,
///   "success": true,
///   "data": { "status": "OK", "service": "attendx", "version": "0.1.0" },
///   "message": "Health check passed"
/// }
/// ```
async fn health_check() -> ApiResponse<HealthReport> {
    let report = HealthReport {
        status: "OK",
        service: config::project_name(),
        version: env!("CARGO_PKG_VERSION"),
    };
    ApiResponse::success(report, "Health check passed")
}

#[cfg(test)]
mod tests {
    use super::health_check;
    use axum::body::to_bytes;
    use axum::response::IntoResponse;
    use serde_json::Value;

    #[tokio::test]
    async fn reports_ok_with_version() {
        let response = health_check().await.into_response();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["statusCode"], 200);
        assert_eq!(json["data"]["status"], "OK");
        assert_eq!(json["data"]["version"], env!("CARGO_PKG_VERSION"));
    }
}
