use service_core::error::AppError;
use thiserror::Error;

/// Service-layer failures.
///
/// Anything that could reveal whether an account exists, or why a code or
/// token was rejected, is collapsed into a single generic variant before it
/// reaches a client.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Wrong code, expired code, no pending code, or unknown email.
    #[error("Invalid or expired code")]
    InvalidOtp,

    /// Bad signature, wrong purpose, or expired reset token.
    #[error("Invalid or expired reset token")]
    InvalidResetToken,

    #[error("Password must be at least {0} characters")]
    WeakPassword(usize),

    #[error("Email delivery failed: {0}")]
    EmailDelivery(String),

    #[error("Admin already exists")]
    AdminAlreadyExists,
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Database(e) => AppError::DatabaseError(anyhow::Error::new(e)),
            ServiceError::Internal(e) => AppError::InternalError(e),
            ServiceError::InvalidCredentials => {
                AppError::AuthError(anyhow::anyhow!("Invalid credentials"))
            }
            ServiceError::InvalidOtp => AppError::BadRequest(anyhow::anyhow!("Invalid or expired code")),
            ServiceError::InvalidResetToken => {
                AppError::BadRequest(anyhow::anyhow!("Invalid or expired reset token"))
            }
            ServiceError::WeakPassword(min) => AppError::BadRequest(anyhow::anyhow!(
                "Password must be at least {} characters",
                min
            )),
            ServiceError::EmailDelivery(e) => AppError::EmailError(e),
            ServiceError::AdminAlreadyExists => {
                AppError::BadRequest(anyhow::anyhow!("Admin already exists"))
            }
        }
    }
}
