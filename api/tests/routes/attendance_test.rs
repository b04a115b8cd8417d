use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::helpers::{TestApp, body_json, make_test_app};

const CAMPUS: (f64, f64) = (12.9716, 77.5946);

async fn check_in(app: &TestApp, student: usize, id: i64, lat: f64, lon: f64) -> (StatusCode, Value) {
    let response = app
        .send_json(
            "POST",
            &format!("/api/attendance/sessions/{id}/check-in"),
            Some(&app.student_token(student)),
            json!({ "latitude": lat, "longitude": lon }),
        )
        .await;
    let status = response.status();
    (status, body_json(response).await)
}

async fn finalize(app: &TestApp, id: i64, body: Value) -> (StatusCode, Value) {
    let response = app
        .send_json(
            "POST",
            &format!("/api/attendance/sessions/{id}/finalize"),
            Some(&app.teacher_token()),
            body,
        )
        .await;
    let status = response.status();
    (status, body_json(response).await)
}

#[tokio::test]
async fn test_start_session_returns_all_absent_roster() {
    let app = make_test_app(3).await;
    let id = app.start_session(CAMPUS.0, CAMPUS.1).await;
    let response = app
        .get(&format!("/api/attendance/sessions/{id}/roster"), Some(&app.teacher_token()))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let roster = json["data"].as_array().unwrap();
    assert_eq!(roster.len(), 3);
    assert!(roster.iter().all(|e| e["status"] == "absent"));
    assert_eq!(roster[0]["regNo"], "1RV23CS001");
}

#[tokio::test]
async fn test_start_session_created_envelope() {
    let app = make_test_app(2).await;
    let response = app
        .send_json(
            "POST",
            "/api/attendance/sessions",
            Some(&app.teacher_token()),
            json!({
                "branch": "CSE",
                "semester": 3,
                "subjectName": "Operating Systems",
                "latitude": CAMPUS.0,
                "longitude": CAMPUS.1
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["statusCode"], 201);
    assert_eq!(json["data"]["students"].as_array().unwrap().len(), 2);
    assert!(json["data"]["sessionEnd"].as_str().is_some());
}

#[tokio::test]
async fn test_start_session_unknown_subject_is_404() {
    let app = make_test_app(1).await;
    let response = app
        .send_json(
            "POST",
            "/api/attendance/sessions",
            Some(&app.teacher_token()),
            json!({
                "branch": "CSE",
                "semester": "III",
                "subjectName": "Compilers",
                "latitude": CAMPUS.0,
                "longitude": CAMPUS.1
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_start_session_rejects_bad_input() {
    let app = make_test_app(1).await;
    let token = app.teacher_token();

    let bad_lat = app
        .send_json(
            "POST",
            "/api/attendance/sessions",
            Some(&token),
            json!({
                "branch": "CSE",
                "semester": "III",
                "subjectName": "Operating Systems",
                "latitude": 91.0,
                "longitude": CAMPUS.1
            }),
        )
        .await;
    assert_eq!(bad_lat.status(), StatusCode::BAD_REQUEST);

    let bad_branch = app
        .send_json(
            "POST",
            "/api/attendance/sessions",
            Some(&token),
            json!({
                "branch": "XYZ",
                "semester": "III",
                "subjectName": "Operating Systems",
                "latitude": CAMPUS.0,
                "longitude": CAMPUS.1
            }),
        )
        .await;
    assert_eq!(bad_branch.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_role_guards() {
    let app = make_test_app(1).await;

    let response = app
        .send_json(
            "POST",
            "/api/attendance/sessions",
            Some(&app.student_token(0)),
            json!({}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.get("/api/attendance/active", Some(&app.teacher_token())).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.get("/api/attendance/active", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Test Case: one student in range, one 5 km away, one never checks in
#[tokio::test]
async fn test_full_session_walkthrough() {
    let app = make_test_app(3).await;
    let id = app.start_session(CAMPUS.0, CAMPUS.1).await;

    let (status, json) = check_in(&app, 0, id, CAMPUS.0, CAMPUS.1).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["success"], true);

    let (status, json) = check_in(&app, 1, id, CAMPUS.0 + 0.045, CAMPUS.1).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["message"], "You are too far away from the class location");

    // the student still waiting sees the session, the one already present does not
    let json = body_json(app.get("/api/attendance/active", Some(&app.student_token(1))).await).await;
    assert_eq!(json["data"]["attendanceId"], id);
    assert_eq!(json["data"]["teacherName"], "Prof. Rao");
    assert_eq!(json["data"]["subjectName"], "Operating Systems");
    let json = body_json(app.get("/api/attendance/active", Some(&app.student_token(0))).await).await;
    assert_eq!(json["data"], Value::Null);
    assert_eq!(json["success"], true);

    let (status, json) = finalize(&app, id, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    let statuses: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["status"].as_str().unwrap())
        .collect();
    assert_eq!(statuses, ["present", "absent", "absent"]);

    let (status, _) = finalize(&app, id, json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = check_in(&app, 2, id, CAMPUS.0, CAMPUS.1).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let json = body_json(app.get("/api/me/notifications", Some(&app.student_token(0))).await).await;
    let today = &json["data"][0];
    assert_eq!(today["date"], "Today");
    assert!(
        today["items"][0]
            .as_str()
            .unwrap()
            .starts_with("You have been successfully marked present for subject Operating Systems")
    );

    let json = body_json(app.get("/api/me/notifications", Some(&app.student_token(2))).await).await;
    assert!(
        json["data"][0]["items"][0]
            .as_str()
            .unwrap()
            .starts_with("You missed the attendance window")
    );
}

#[tokio::test]
async fn test_finalize_applies_overrides() {
    let app = make_test_app(2).await;
    let id = app.start_session(CAMPUS.0, CAMPUS.1).await;
    let student = app.room.students[1].id;

    let (status, json) = finalize(
        &app,
        id,
        json!({ "records": [{ "studentId": student, "status": "present" }] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"][0]["status"], "absent");
    assert_eq!(json["data"][1]["status"], "present");
}

#[tokio::test]
async fn test_finalize_rejects_invalid_status() {
    let app = make_test_app(1).await;
    let id = app.start_session(CAMPUS.0, CAMPUS.1).await;
    let student = app.room.students[0].id;

    let (status, _) = finalize(
        &app,
        id,
        json!({ "records": [{ "studentId": student, "status": "late" }] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // the session is still open
    let response = app
        .get(&format!("/api/attendance/sessions/{id}/roster"), Some(&app.teacher_token()))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_check_in_unknown_session_is_404() {
    let app = make_test_app(1).await;
    let (status, json) = check_in(&app, 0, 9999, CAMPUS.0, CAMPUS.1).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_start_pushes_to_students_with_devices() {
    let app = make_test_app(3).await;
    let id = app.start_session(CAMPUS.0, CAMPUS.1).await;

    // delivery runs in a background task
    let mut sent = Vec::new();
    for _ in 0..50 {
        sent = app.push.sent().await;
        if sent.len() == 2 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }

    let mut tokens: Vec<&str> = sent.iter().map(|(t, _)| t.as_str()).collect();
    tokens.sort();
    assert_eq!(tokens, ["device-1", "device-2"]);
    assert_eq!(sent[0].1.data["attendanceId"], id.to_string());
}

#[tokio::test]
async fn test_non_numeric_session_id_is_400_envelope() {
    let app = make_test_app(1).await;

    let response = app
        .send_json(
            "POST",
            "/api/attendance/sessions/abc/check-in",
            Some(&app.student_token(0)),
            json!({ "latitude": CAMPUS.0, "longitude": CAMPUS.1 }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["statusCode"], 400);
    assert_eq!(json["success"], false);
    assert!(json["data"].is_null());
    assert!(json["message"].as_str().unwrap().contains("abc"));

    let response = app
        .get("/api/attendance/sessions/abc/roster", Some(&app.teacher_token()))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["success"], false);
}
