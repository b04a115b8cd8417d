//! SMTP delivery of login OTPs.
//!
//! Uses the `lettre` crate over STARTTLS. Configured through `SMTP_HOST`,
//! `SMTP_USERNAME`, `SMTP_PASSWORD`, `EMAIL_FROM_NAME` and `EMAIL_FROM_ADDRESS`.
//! When `SMTP_HOST` is empty, OTPs are logged instead of sent.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
    message::{Mailbox, Message, MultiPart, SinglePart, header},
    transport::smtp::authentication::Credentials,
};
use services::{
    error::AppError,
    mailer::{LogMailer, Mailer},
};
use util::config::AppConfig;

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    from_name: String,
}

impl SmtpMailer {
    pub fn from_config() -> Result<Self, AppError> {
        let cfg = AppConfig::global();

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.smtp_host)
            .map_err(|e| AppError::internal(format!("Invalid SMTP relay: {e}")))?
            .credentials(Credentials::new(
                cfg.smtp_username.clone(),
                cfg.smtp_password.clone(),
            ))
            .build();

        let from: Mailbox = format!("{} <{}>", cfg.email_from_name, cfg.email_from_address)
            .parse()
            .map_err(|e| AppError::internal(format!("Invalid sender address: {e}")))?;

        Ok(Self {
            transport,
            from,
            from_name: cfg.email_from_name.clone(),
        })
    }

    fn otp_message(&self, to: Mailbox, otp: &str, valid_minutes: u64) -> Result<Message, AppError> {
        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject("Your login OTP")
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(format!(
                                "Your OTP is: {otp}. It is valid for {valid_minutes} minutes.\n\n\
                                 Do not share it with anyone.\n\n\
                                 {}",
                                self.from_name
                            )),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(format!(
                                r#"<div style="font-family: Arial, sans-serif; line-height: 1.5;">
                                    <h2>Login OTP</h2>
                                    <p>Your one-time password (OTP) is:</p>
                                    <h3 style="color: #2e86de;">{otp}</h3>
                                    <p>This OTP is valid for <strong>{valid_minutes} minutes</strong>. Do not share it with anyone.</p>
                                    <p>{}</p>
                                </div>"#,
                                self.from_name
                            )),
                    ),
            )
            .map_err(|e| AppError::internal(format!("Failed to build email: {e}")))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_otp(&self, to: &str, otp: &str, valid_minutes: u64) -> Result<(), AppError> {
        let to: Mailbox = to
            .parse()
            .map_err(|_| AppError::invalid("Invalid recipient address"))?;
        let email = self.otp_message(to, otp, valid_minutes)?;

        self.transport.send(email).await.map_err(|e| {
            tracing::error!(error = %e, "SMTP delivery failed");
            AppError::internal("Failed to send OTP email")
        })?;
        Ok(())
    }
}

/// SMTP when `SMTP_HOST` is set, log-only otherwise.
pub fn from_config() -> Arc<dyn Mailer> {
    let host_set = !AppConfig::global().smtp_host.trim().is_empty();
    if !host_set {
        tracing::warn!("SMTP_HOST not set; OTP emails will only be logged");
        return Arc::new(LogMailer);
    }

    match SmtpMailer::from_config() {
        Ok(mailer) => Arc::new(mailer),
        Err(e) => {
            tracing::error!(error = %e, "SMTP misconfigured; falling back to logging mailer");
            Arc::new(LogMailer)
        }
    }
}
