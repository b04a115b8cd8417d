use axum::http::StatusCode;

use crate::helpers::{body_json, make_test_app};

#[tokio::test]
async fn test_verify_without_token_is_401() {
    let app = make_test_app(0).await;
    let response = app.get("/api/auth/verify", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["data"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_verify_with_garbage_token_is_401() {
    let app = make_test_app(0).await;
    let response = app.get("/api/auth/verify", Some("not.a.jwt")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_verify_student_token() {
    let app = make_test_app(1).await;
    let response = app.get("/api/auth/verify", Some(&app.student_token(0))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["role"], "student");
    assert_eq!(json["data"]["name"], "Student 1");
}
