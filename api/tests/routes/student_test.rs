use axum::http::StatusCode;
use chrono::{Datelike, Utc};
use serde_json::json;

use crate::helpers::{body_json, make_test_app};

const CAMPUS: (f64, f64) = (12.9716, 77.5946);

#[tokio::test]
async fn test_student_reports_after_session() {
    let app = make_test_app(2).await;
    let id = app.start_session(CAMPUS.0, CAMPUS.1).await;
    app.send_json(
        "POST",
        &format!("/api/attendance/sessions/{id}/check-in"),
        Some(&app.student_token(0)),
        json!({ "latitude": CAMPUS.0, "longitude": CAMPUS.1 }),
    )
    .await;
    app.send_json(
        "POST",
        &format!("/api/attendance/sessions/{id}/finalize"),
        Some(&app.teacher_token()),
        json!({}),
    )
    .await;

    let present = app.student_token(0);
    let absent = app.student_token(1);

    let json = body_json(app.get("/api/student/subjects", Some(&present)).await).await;
    assert_eq!(
        json["data"],
        json!([{
            "id": app.room.subject.id,
            "name": "Operating Systems",
            "code": "CS301",
            "professor": "Prof. Rao",
            "total": 1,
            "present": 1
        }])
    );

    let json = body_json(app.get("/api/student/logs", Some(&present)).await).await;
    assert_eq!(json["data"][0]["status"], "SUCCESS");
    let json = body_json(app.get("/api/student/logs", Some(&absent)).await).await;
    assert_eq!(json["data"][0]["status"], "FAILED");

    let now = Utc::now();
    let uri = format!("/api/student/subjects/monthly?month={}&year={}", now.month(), now.year());
    let json = body_json(app.get(&uri, Some(&absent)).await).await;
    assert_eq!(json["data"][0]["code"], "CS301");
    assert_eq!(json["data"][0]["total"], 1);
    assert_eq!(json["data"][0]["percentage"], 0.0);
}

#[tokio::test]
async fn test_monthly_requires_month_and_year() {
    let app = make_test_app(1).await;
    let token = app.student_token(0);

    let response = app.get("/api/student/subjects/monthly?month=3", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .get("/api/student/subjects/monthly?month=0&year=2026", Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_no_sessions_means_empty_reports() {
    let app = make_test_app(1).await;
    let token = app.student_token(0);

    let json = body_json(app.get("/api/student/subjects", Some(&token)).await).await;
    assert_eq!(json["data"], json!([]));
    let json = body_json(app.get("/api/student/logs", Some(&token)).await).await;
    assert_eq!(json["data"], json!([]));
}

#[tokio::test]
async fn test_student_routes_reject_teachers() {
    let app = make_test_app(0).await;
    let response = app.get("/api/student/subjects", Some(&app.teacher_token())).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
