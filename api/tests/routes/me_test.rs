use axum::http::StatusCode;
use db::models::user;
use serde_json::json;

use crate::helpers::{body_json, make_test_app};

#[tokio::test]
async fn test_student_profile() {
    let app = make_test_app(1).await;
    let response = app.get("/api/me", Some(&app.student_token(0))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["regNo"], "1RV23CS001");
    assert_eq!(data["year"], 2);
    assert_eq!(data["class"]["code"], "CSE-III");
    assert_eq!(data["class"]["semester"], "III");
    assert!(data.get("teacherIdNo").is_none());
}

#[tokio::test]
async fn test_teacher_profile() {
    let app = make_test_app(0).await;
    let response = app.get("/api/me", Some(&app.teacher_token())).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["teacherIdNo"], "T001");
    assert!(json["data"].get("regNo").is_none());
}

#[tokio::test]
async fn test_me_requires_token() {
    let app = make_test_app(0).await;
    let response = app.get("/api/me", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_device_token_set_and_clear() {
    let app = make_test_app(1).await;
    let student = &app.room.students[0];
    let token = app.student_token(0);

    let response = app
        .send_json("PUT", "/api/me/device-token", Some(&token), json!({ "token": "new-device" }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let stored = user::Model::find_by_id(app.state.db(), student.id).await.unwrap().unwrap();
    assert_eq!(stored.fcm_token.as_deref(), Some("new-device"));

    let response = app
        .send_json("PUT", "/api/me/device-token", Some(&token), json!({ "token": "  " }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let stored = user::Model::find_by_id(app.state.db(), student.id).await.unwrap().unwrap();
    assert!(stored.fcm_token.is_none());
}

#[tokio::test]
async fn test_notifications_empty_inbox() {
    let app = make_test_app(1).await;
    let response = app.get("/api/me/notifications", Some(&app.student_token(0))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"], json!([]));
}
