//! Email OTP login.
//!
//! Issuing the bearer token is left to the HTTP layer; this module only
//! proves that the caller controls the email address.

use std::sync::Arc;

use chrono::{Duration, Utc};
use db::models::user;
use rand::Rng;
use sea_orm::DatabaseConnection;
use tracing::{info, warn};
use util::config::AppConfig;

use crate::error::AppError;
use crate::mailer::Mailer;

pub const OTP_LENGTH: usize = 6;

/// Uniformly random six-digit code without a leading zero.
pub fn generate_otp() -> String {
    rand::rng().random_range(100_000..1_000_000u32).to_string()
}

fn normalize_email(email: &str) -> Result<String, AppError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::invalid("A valid email address is required"));
    }
    Ok(email)
}

#[derive(Clone)]
pub struct OtpService {
    db: DatabaseConnection,
    mailer: Arc<dyn Mailer>,
    expiry_minutes: u64,
}

impl OtpService {
    pub fn new(db: DatabaseConnection, mailer: Arc<dyn Mailer>, expiry_minutes: u64) -> Self {
        Self {
            db,
            mailer,
            expiry_minutes,
        }
    }

    pub fn from_config(db: DatabaseConnection, mailer: Arc<dyn Mailer>) -> Self {
        let minutes = AppConfig::global().otp_expiry_minutes;
        Self::new(db, mailer, minutes)
    }

    /// Stores a fresh OTP for the user and mails it.
    pub async fn send_otp(&self, email: &str) -> Result<(), AppError> {
        let email = normalize_email(email)?;
        let user = user::Model::find_by_email(&self.db, &email)
            .await?
            .ok_or_else(|| AppError::not_found("No account found for this email"))?;

        let otp = generate_otp();
        let expiry = Utc::now() + Duration::minutes(self.expiry_minutes as i64);
        user::Model::set_otp(&self.db, user.id, &otp, expiry).await?;

        if let Err(e) = self.mailer.send_otp(&email, &otp, self.expiry_minutes).await {
            warn!(user_id = user.id, error = %e, "Failed to deliver OTP email");
            return Err(AppError::internal("Failed to send OTP email"));
        }

        info!(user_id = user.id, "Login OTP sent");
        Ok(())
    }

    /// Consumes a valid OTP and returns the authenticated user.
    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<user::Model, AppError> {
        let email = normalize_email(email)?;
        let user = user::Model::find_by_email(&self.db, &email)
            .await?
            .ok_or_else(|| AppError::not_found("No account found for this email"))?;

        if !user.otp_matches(otp, Utc::now()) {
            warn!(user_id = user.id, "OTP verification failed");
            return Err(AppError::invalid("Invalid or expired OTP"));
        }

        let user = user::Model::clear_otp(&self.db, user.id).await?;
        info!(user_id = user.id, role = %user.role, "OTP verified");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailer::{CapturingMailer, FailingMailer};
    use db::test_utils::{seed_classroom, setup_test_db};

    #[test]
    fn otp_is_six_digits() {
        for _ in 0..100 {
            let otp = generate_otp();
            assert_eq!(otp.len(), OTP_LENGTH);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[tokio::test]
    async fn send_then_verify_consumes_otp() {
        let db = setup_test_db().await;
        seed_classroom(&db, 1).await;
        let mailer = Arc::new(CapturingMailer::new());
        let svc = OtpService::new(db.clone(), mailer.clone(), 5);

        svc.send_otp("  S1@Test.com ").await.unwrap();
        let otp = mailer.last_otp_for("s1@test.com").await.unwrap();

        let err = svc.verify_otp("s1@test.com", "000000").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        let user = svc.verify_otp("s1@test.com", &otp).await.unwrap();
        assert_eq!(user.email, "s1@test.com");
        assert!(user.otp.is_none());

        let err = svc.verify_otp("s1@test.com", &otp).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn expired_otp_is_rejected() {
        let db = setup_test_db().await;
        let room = seed_classroom(&db, 1).await;
        let svc = OtpService::new(db.clone(), Arc::new(CapturingMailer::new()), 5);

        user::Model::set_otp(&db, room.students[0].id, "123456", Utc::now() - Duration::seconds(1))
            .await
            .unwrap();
        let err = svc.verify_otp("s1@test.com", "123456").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn unknown_email_and_mail_failure() {
        let db = setup_test_db().await;
        seed_classroom(&db, 1).await;

        let svc = OtpService::new(db.clone(), Arc::new(CapturingMailer::new()), 5);
        assert!(matches!(
            svc.send_otp("nobody@test.com").await.unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            svc.send_otp("not-an-email").await.unwrap_err(),
            AppError::InvalidInput(_)
        ));

        let failing = OtpService::new(db.clone(), Arc::new(FailingMailer), 5);
        assert!(matches!(
            failing.send_otp("s1@test.com").await.unwrap_err(),
            AppError::Internal(_)
        ));
    }
}
