use axum::http::{StatusCode, header};
use chrono::Utc;
use serde_json::json;

use crate::helpers::{TestApp, body_json, make_test_app};

const CAMPUS: (f64, f64) = (12.9716, 77.5946);

/// Runs one session where only the first student checks in.
async fn run_session(app: &TestApp) -> i64 {
    let id = app.start_session(CAMPUS.0, CAMPUS.1).await;
    app.send_json(
        "POST",
        &format!("/api/attendance/sessions/{id}/check-in"),
        Some(&app.student_token(0)),
        json!({ "latitude": CAMPUS.0, "longitude": CAMPUS.1 }),
    )
    .await;
    let response = app
        .send_json(
            "POST",
            &format!("/api/attendance/sessions/{id}/finalize"),
            Some(&app.teacher_token()),
            json!({}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    id
}

#[tokio::test]
async fn test_subjects_grouped_by_semester() {
    let app = make_test_app(0).await;
    let response = app.get("/api/teacher/subjects", Some(&app.teacher_token())).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(
        json["data"],
        json!([{
            "semester": "Sem III",
            "subjects": [{ "name": "Operating Systems", "code": "CS301", "branch": "CSE" }]
        }])
    );
}

#[tokio::test]
async fn test_logs_after_session() {
    let app = make_test_app(3).await;
    let id = run_session(&app).await;

    let json = body_json(app.get("/api/teacher/logs", Some(&app.teacher_token())).await).await;
    let log = &json["data"][0];
    assert_eq!(log["attendanceId"], id);
    assert_eq!(log["subject"], "Operating Systems");
    assert_eq!((log["total"].as_u64(), log["present"].as_u64(), log["absent"].as_u64()), (Some(3), Some(1), Some(2)));
    assert_eq!(log["date"], Utc::now().format("%Y-%m-%d").to_string());
}

#[tokio::test]
async fn test_student_analytics() {
    let app = make_test_app(2).await;
    run_session(&app).await;

    let uri = format!("/api/teacher/analytics/students?subjectId={}", app.room.subject.id);
    let response = app.get(&uri, Some(&app.teacher_token())).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"][0]["regNo"], "1RV23CS001");
    assert_eq!(json["data"][0]["percentage"], 100.0);
    assert_eq!(json["data"][1]["percentage"], 0.0);
}

#[tokio::test]
async fn test_analytics_requires_subject_id() {
    let app = make_test_app(0).await;
    let response = app.get("/api/teacher/analytics/students", Some(&app.teacher_token())).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .get("/api/teacher/analytics/students?subjectId=424242", Some(&app.teacher_token()))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_export_csv() {
    let app = make_test_app(2).await;
    run_session(&app).await;

    let now = Utc::now();
    let uri = format!(
        "/api/teacher/attendance/export?subjectId={}&month={}&year={}",
        app.room.subject.id,
        now.format("%-m"),
        now.format("%Y")
    );
    let response = app.get(&uri, Some(&app.teacher_token())).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/csv")
    );
    let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.contains(&format!("CS301_attendance_{}.csv", now.format("%Y-%m"))));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let csv = String::from_utf8(body.to_vec()).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Reg No,Name,"));
    assert!(lines[1].ends_with(",P,1,1,100.00"));
    assert!(lines[2].ends_with(",A,1,0,0.00"));
}

#[tokio::test]
async fn test_export_rejects_bad_month() {
    let app = make_test_app(0).await;
    let uri = format!("/api/teacher/attendance/export?subjectId={}&month=13", app.room.subject.id);
    let response = app.get(&uri, Some(&app.teacher_token())).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_teacher_routes_reject_students() {
    let app = make_test_app(1).await;
    let response = app.get("/api/teacher/logs", Some(&app.student_token(0))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
