use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::{body_json, make_test_app};

/// Test Case: OTP sent to a registered email can be exchanged for a token
#[tokio::test]
async fn test_otp_login_flow() {
    let app = make_test_app(1).await;

    let response = app
        .send_json("POST", "/api/auth/otp/send", None, json!({ "email": "RAO@test.com" }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"], serde_json::Value::Null);

    let otp = app.mailer.last_otp_for("rao@test.com").await.expect("otp mailed");
    assert_eq!(otp.len(), 6);

    let response = app
        .send_json(
            "POST",
            "/api/auth/otp/verify",
            None,
            json!({ "email": "rao@test.com", "otp": otp }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["role"], "teacher");
    assert!(json["data"]["expiresAt"].as_str().is_some());

    let token = json["data"]["token"].as_str().unwrap().to_string();
    let response = app.get("/api/auth/verify", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["email"], "rao@test.com");
    assert_eq!(json["data"]["department"], "CSE");
}

/// Test Case: An OTP is single use
#[tokio::test]
async fn test_otp_cannot_be_reused() {
    let app = make_test_app(1).await;
    app.send_json("POST", "/api/auth/otp/send", None, json!({ "email": "s1@test.com" }))
        .await;
    let otp = app.mailer.last_otp_for("s1@test.com").await.unwrap();

    let body = json!({ "email": "s1@test.com", "otp": otp });
    let first = app.send_json("POST", "/api/auth/otp/verify", None, body.clone()).await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = app.send_json("POST", "/api/auth/otp/verify", None, body).await;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_send_otp_unknown_email_is_404() {
    let app = make_test_app(0).await;
    let response = app
        .send_json("POST", "/api/auth/otp/send", None, json!({ "email": "ghost@test.com" }))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["statusCode"], 404);
    assert!(app.mailer.outbox().await.is_empty());
}

#[tokio::test]
async fn test_send_otp_invalid_email_is_400() {
    let app = make_test_app(0).await;
    let response = app
        .send_json("POST", "/api/auth/otp/send", None, json!({ "email": "not-an-email" }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Invalid email format");
}

#[tokio::test]
async fn test_verify_wrong_otp_is_400() {
    let app = make_test_app(0).await;
    app.send_json("POST", "/api/auth/otp/send", None, json!({ "email": "rao@test.com" }))
        .await;
    let otp = app.mailer.last_otp_for("rao@test.com").await.unwrap();
    let wrong = if otp == "000000" { "111111" } else { "000000" };

    let response = app
        .send_json(
            "POST",
            "/api/auth/otp/verify",
            None,
            json!({ "email": "rao@test.com", "otp": wrong }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
