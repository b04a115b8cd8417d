use std::sync::Arc;

use api::{
    auth::generate_jwt,
    routes::routes,
    state::{AppState, JwtKeys},
};
use axum::{
    Router,
    body::Body,
    http::{Request, header},
    response::Response,
};
use db::{
    models::user,
    test_utils::{Classroom, seed_classroom, setup_test_db},
};
use serde_json::Value;
use services::{mailer::CapturingMailer, push::RecordingPushGateway, session_store::MemoryStore};
use tower::ServiceExt;

/// Router plus the state and fixtures behind it.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub room: Classroom,
    pub mailer: Arc<CapturingMailer>,
    pub push: Arc<RecordingPushGateway>,
}

/// Builds the `/api` router over a fresh in-memory database seeded with one
/// classroom of `students` students.
pub async fn make_test_app(students: usize) -> TestApp {
    let db = setup_test_db().await;
    let room = seed_classroom(&db, students).await;

    let mailer = Arc::new(CapturingMailer::new());
    let push = Arc::new(RecordingPushGateway::new());
    let state = AppState::new(
        db,
        Arc::new(MemoryStore::new()),
        push.clone(),
        mailer.clone(),
        JwtKeys::new("test-secret", 60),
    );

    let router = Router::new()
        .nest("/api", routes(state.clone()))
        .with_state(state.clone());

    TestApp {
        router,
        state,
        room,
        mailer,
        push,
    }
}

impl TestApp {
    pub fn token_for(&self, user: &user::Model) -> String {
        let (token, _) = generate_jwt(self.state.jwt(), user.id, user.role).expect("token");
        token
    }

    pub fn teacher_token(&self) -> String {
        self.token_for(&self.room.teacher)
    }

    pub fn student_token(&self, index: usize) -> String {
        self.token_for(&self.room.students[index])
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response {
        let mut req = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.router
            .clone()
            .oneshot(req.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    pub async fn send_json(&self, method: &str, uri: &str, token: Option<&str>, body: Value) -> Response {
        let mut req = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.router
            .clone()
            .oneshot(req.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap()
    }

    /// Starts a session for the seeded class at the given teacher position and
    /// returns its id.
    pub async fn start_session(&self, latitude: f64, longitude: f64) -> i64 {
        let response = self
            .send_json(
                "POST",
                "/api/attendance/sessions",
                Some(&self.teacher_token()),
                serde_json::json!({
                    "branch": "CSE",
                    "semester": "III",
                    "subjectName": "Operating Systems",
                    "latitude": latitude,
                    "longitude": longitude
                }),
            )
            .await;
        let json = body_json(response).await;
        json["data"]["attendanceId"].as_i64().expect("attendance id")
    }
}

pub async fn body_json(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
