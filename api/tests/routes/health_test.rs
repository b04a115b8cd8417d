use axum::http::StatusCode;

use crate::helpers::{body_json, make_test_app};

#[tokio::test]
async fn test_health_check() {
    let app = make_test_app(0).await;

    let response = app.get("/api/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["status"], "OK");
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = make_test_app(0).await;
    let response = app.get("/api/nope", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
