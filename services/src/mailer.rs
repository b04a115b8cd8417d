//! Outgoing mail seam. The SMTP implementation lives in the `api` crate.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::AppError;

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Delivers a login OTP valid for `valid_minutes`.
    async fn send_otp(&self, to: &str, otp: &str, valid_minutes: u64) -> Result<(), AppError>;
}

/// Used when SMTP is not configured.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_otp(&self, to: &str, _otp: &str, valid_minutes: u64) -> Result<(), AppError> {
        tracing::info!(target: "services::mailer", to, valid_minutes, "SMTP not configured; OTP email not sent");
        Ok(())
    }
}

/// Captures `(recipient, otp)` pairs instead of sending mail.
#[derive(Default)]
pub struct CapturingMailer {
    outbox: Mutex<Vec<(String, String)>>,
}

impl CapturingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn outbox(&self) -> Vec<(String, String)> {
        self.outbox.lock().await.clone()
    }

    /// Most recent OTP sent to `to`.
    pub async fn last_otp_for(&self, to: &str) -> Option<String> {
        self.outbox
            .lock()
            .await
            .iter()
            .rev()
            .find(|(addr, _)| addr == to)
            .map(|(_, otp)| otp.clone())
    }
}

#[async_trait]
impl Mailer for CapturingMailer {
    async fn send_otp(&self, to: &str, otp: &str, _valid_minutes: u64) -> Result<(), AppError> {
        self.outbox.lock().await.push((to.to_string(), otp.to_string()));
        Ok(())
    }
}

/// Always fails. Exercises the mail-failure path.
pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send_otp(&self, _to: &str, _otp: &str, _valid_minutes: u64) -> Result<(), AppError> {
        Err(AppError::internal("Failed to send OTP email"))
    }
}
