//! Authentication and password-reset orchestration.
//!
//! The reset flow is enumeration-resistant: a request for an unknown email
//! succeeds with the same response as a known one, and a failed code check
//! never says which part of the check failed.

use std::sync::Arc;

use crate::{
    dtos::auth::{
        ForgotPasswordRequest, LoginRequest, LoginResponse, ResetPasswordRequest,
        VerifyOtpRequest, VerifyOtpResponse,
    },
    services::{otp, CredentialStore, EmailProvider, ServiceError, TokenService},
    utils::{hash_password, verify_password, Password, PasswordHashString},
};

pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Clone)]
pub struct AuthService {
    credentials: Arc<dyn CredentialStore>,
    email: Arc<dyn EmailProvider>,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        email: Arc<dyn EmailProvider>,
        tokens: TokenService,
    ) -> Self {
        Self {
            credentials,
            email,
            tokens,
        }
    }

    /// Exchange email and password for a session token.
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, ServiceError> {
        let email = req.email.to_lowercase();

        let admin = self
            .credentials
            .find_by_email(&email)
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        verify_password(
            &Password::new(req.password),
            &PasswordHashString::new(admin.password_hash.clone()),
        )
        .map_err(|_| ServiceError::InvalidCredentials)?;

        let token = self
            .tokens
            .issue_session(&admin.id, admin.role)
            .map_err(ServiceError::Internal)?;

        tracing::info!(admin_id = %admin.id, "Admin logged in");

        Ok(LoginResponse {
            token,
            user: admin.view(),
        })
    }

    /// Start a password reset by emailing a one-time code.
    ///
    /// Succeeds silently for unknown emails. A repeated request replaces the
    /// previous pending code. If delivery fails, the stored code is cleared
    /// so an attacker cannot probe against a code nobody received.
    pub async fn request_reset(&self, req: ForgotPasswordRequest) -> Result<(), ServiceError> {
        let email = req.email.to_lowercase();

        let issued = otp::issue();
        let known = self
            .credentials
            .set_pending_otp(&email, &issued.code_hash, issued.expires_at)
            .await?;

        if !known {
            tracing::debug!("Password reset requested for unknown email");
            return Ok(());
        }

        if let Err(e) = self.email.send_reset_code(&email, &issued.code).await {
            self.credentials.clear_pending_otp(&email).await?;
            return Err(e);
        }

        tracing::info!("Password reset code issued");
        Ok(())
    }

    /// Exchange a valid one-time code for a short-lived reset token.
    /// The code is consumed whether or not the caller finishes the reset.
    pub async fn verify_reset(
        &self,
        req: VerifyOtpRequest,
    ) -> Result<VerifyOtpResponse, ServiceError> {
        let email = req.email.to_lowercase();
        let code_hash = otp::hash_code(&req.otp);

        let admin = self
            .credentials
            .consume_pending_otp(&email, &code_hash)
            .await?
            .ok_or(ServiceError::InvalidOtp)?;

        let reset_token = self
            .tokens
            .issue_reset(&admin.id)
            .map_err(ServiceError::Internal)?;

        tracing::info!(admin_id = %admin.id, "Reset code verified");

        Ok(VerifyOtpResponse {
            message: "Code verified".to_string(),
            reset_token,
        })
    }

    /// Finish the reset: replace the password under a valid reset token.
    pub async fn complete_reset(&self, req: ResetPasswordRequest) -> Result<(), ServiceError> {
        let claims = self
            .tokens
            .verify_reset(&req.reset_token)
            .map_err(|_| ServiceError::InvalidResetToken)?;

        if req.password.len() < MIN_PASSWORD_LENGTH {
            return Err(ServiceError::WeakPassword(MIN_PASSWORD_LENGTH));
        }

        let password_hash =
            hash_password(&Password::new(req.password)).map_err(ServiceError::Internal)?;

        let updated = self
            .credentials
            .reset_password(&claims.sub, password_hash.as_str())
            .await?;
        if !updated {
            // Account deleted between token issue and use.
            return Err(ServiceError::InvalidResetToken);
        }

        tracing::info!(admin_id = %claims.sub, "Password reset completed");
        Ok(())
    }
}
