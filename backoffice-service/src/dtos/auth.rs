//! Request/response bodies for the auth endpoints.
//!
//! Field names follow the public site contract (camelCase where the client
//! already sends it, e.g. `resetToken`).

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::AdminView;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "admin@example.com")]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "password123")]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: AdminView,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "admin@example.com")]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VerifyOtpRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "admin@example.com")]
    pub email: String,

    #[validate(length(min = 1, message = "OTP is required"))]
    #[schema(example = "123456")]
    pub otp: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpResponse {
    #[schema(example = "Code verified. Use the reset token to set a new password.")]
    pub message: String,
    pub reset_token: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    #[schema(example = "newpass1", min_length = 6)]
    pub password: String,

    #[validate(length(min = 1, message = "Reset token is required"))]
    pub reset_token: String,
}
