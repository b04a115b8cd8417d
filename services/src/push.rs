//! Push delivery to student devices.
//!
//! Delivery runs on a background task (see [`crate::notifications::Notifier`]),
//! so gateway failures are logged and never surface to the HTTP caller.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use tokio::sync::Mutex;

use crate::error::AppError;

const FCM_ENDPOINT: &str = "https://fcm.googleapis.com/fcm/send";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    pub data: BTreeMap<String, String>,
}

impl PushMessage {
    /// Sent to every enrolled student with a device token when a session opens.
    pub fn attendance_started(attendance_id: i64) -> Self {
        Self {
            title: "Kindly Mark your attendance".into(),
            body: "Click this notification to mark your attendance".into(),
            data: BTreeMap::from([("attendanceId".to_string(), attendance_id.to_string())]),
        }
    }
}

#[async_trait]
pub trait PushGateway: Send + Sync {
    async fn send(&self, device_token: &str, message: &PushMessage) -> Result<(), AppError>;
}

/// Firebase Cloud Messaging over the legacy HTTP API.
pub struct FcmGateway {
    client: reqwest::Client,
    server_key: String,
}

impl FcmGateway {
    pub fn new(server_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            server_key: server_key.into(),
        }
    }
}

#[async_trait]
impl PushGateway for FcmGateway {
    async fn send(&self, device_token: &str, message: &PushMessage) -> Result<(), AppError> {
        let payload = json!({
            "to": device_token,
            "notification": { "title": message.title, "body": message.body },
            "data": message.data,
        });

        let response = self
            .client
            .post(FCM_ENDPOINT)
            .header("Authorization", format!("key={}", self.server_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::internal(format!("Push request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::internal(format!(
                "Push gateway responded with {}",
                response.status()
            )));
        }
        Ok(())
    }
}

/// Used when no FCM key is configured: messages are only logged.
pub struct LogPushGateway;

#[async_trait]
impl PushGateway for LogPushGateway {
    async fn send(&self, device_token: &str, message: &PushMessage) -> Result<(), AppError> {
        tracing::info!(
            target: "services::push",
            device_token,
            title = %message.title,
            "Push delivery disabled; message dropped"
        );
        Ok(())
    }
}

/// Keeps every message it is asked to send. Used by tests and local tooling.
#[derive(Default)]
pub struct RecordingPushGateway {
    sent: Mutex<Vec<(String, PushMessage)>>,
}

impl RecordingPushGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<(String, PushMessage)> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl PushGateway for RecordingPushGateway {
    async fn send(&self, device_token: &str, message: &PushMessage) -> Result<(), AppError> {
        self.sent
            .lock()
            .await
            .push((device_token.to_string(), message.clone()));
        Ok(())
    }
}

/// FCM when `FCM_SERVER_KEY` is set, log-only otherwise.
pub fn from_config() -> Arc<dyn PushGateway> {
    let key = util::config::AppConfig::global().fcm_server_key.clone();
    if key.trim().is_empty() {
        tracing::warn!(target: "services::push", "FCM_SERVER_KEY not set; push notifications will only be logged");
        Arc::new(LogPushGateway)
    } else {
        Arc::new(FcmGateway::new(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attendance_started_carries_the_session_id() {
        let msg = PushMessage::attendance_started(17);
        assert_eq!(msg.title, "Kindly Mark your attendance");
        assert_eq!(msg.data.get("attendanceId").map(String::as_str), Some("17"));
    }

    #[tokio::test]
    async fn recording_gateway_keeps_messages() {
        let gw = RecordingPushGateway::new();
        gw.send("tok", &PushMessage::attendance_started(1)).await.unwrap();
        let sent = gw.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "tok");
    }
}
