//! Out-of-band delivery of password-reset codes.

use lettre::{
    message::{header::ContentType, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    Message, SmtpTransport, Transport,
};
use service_core::async_trait::async_trait;
use std::time::Duration;

use crate::config::SmtpConfig;
use crate::services::error::ServiceError;
use crate::services::otp::OTP_TTL_MINUTES;

#[async_trait]
pub trait EmailProvider: Send + Sync {
    /// Deliver the plaintext reset code to the admin's address.
    async fn send_reset_code(&self, to_email: &str, code: &str) -> Result<(), ServiceError>;
}

#[derive(Clone)]
pub struct SmtpEmailService {
    mailer: SmtpTransport,
    from_email: String,
}

impl SmtpEmailService {
    pub fn new(config: &SmtpConfig) -> Result<Self, ServiceError> {
        let creds = Credentials::new(config.user.clone(), config.password.clone());

        let mailer = SmtpTransport::relay(&config.host)
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!(e.to_string())))?
            .credentials(creds)
            .port(config.port)
            .timeout(Some(Duration::from_secs(10)))
            .build();

        tracing::info!(host = %config.host, "Email service initialized");

        Ok(Self {
            mailer,
            from_email: config.from.clone(),
        })
    }
}

#[async_trait]
impl EmailProvider for SmtpEmailService {
    async fn send_reset_code(&self, to_email: &str, code: &str) -> Result<(), ServiceError> {
        let html_body = format!(
            r###"<html>
                <body style="font-family: Arial, sans-serif;">
                    <h2>Password Reset Request</h2>
                    <p>Use the code below to continue resetting your password:</p>
                    <p style="font-size: 32px; font-weight: bold; letter-spacing: 5px;">{code}</p>
                    <p style="color: #666; font-size: 12px;">
                        This code expires in {ttl} minutes. Never share it with anyone.
                        If you didn't request this, you can ignore this email.
                    </p>
                </body>
            </html>"###,
            code = code,
            ttl = OTP_TTL_MINUTES,
        );

        let plain_body = format!(
            "Password Reset Request\n\nYour code: {}\n\nThis code expires in {} minutes. \
             Never share it with anyone. If you didn't request this, you can ignore this email.",
            code, OTP_TTL_MINUTES,
        );

        let email = Message::builder()
            .from(
                self.from_email
                    .parse()
                    .map_err(|e: lettre::address::AddressError| {
                        ServiceError::Internal(e.into())
                    })?,
            )
            .to(to_email
                .parse()
                .map_err(|e: lettre::address::AddressError| ServiceError::Internal(e.into()))?)
            .subject("Password Reset Code")
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(plain_body),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body),
                    ),
            )
            .map_err(|e| ServiceError::Internal(e.into()))?;

        // Send on the blocking pool; SmtpTransport is synchronous.
        let mailer = self.mailer.clone();
        let result = tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| ServiceError::Internal(e.into()))?;

        match result {
            Ok(_) => {
                tracing::info!(to = %to_email, "Reset code email sent");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, to = %to_email, "Failed to send reset code email");
                Err(ServiceError::EmailDelivery(e.to_string()))
            }
        }
    }
}

/// No-op sender for local development without SMTP credentials.
#[derive(Clone)]
pub struct MockEmailService;

#[async_trait]
impl EmailProvider for MockEmailService {
    async fn send_reset_code(&self, to_email: &str, _code: &str) -> Result<(), ServiceError> {
        tracing::debug!(to = %to_email, "Mock email sender: dropping reset code");
        Ok(())
    }
}
