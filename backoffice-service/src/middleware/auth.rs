//! Bearer-token gate for privileged routes.
//!
//! Authentication (is the token a valid session token) and authorization
//! (does the embedded role belong to the closed admin set) are separate
//! layers so the distinction between 401 and 403 stays sharp.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use service_core::error::AppError;

use crate::models::AdminRole;
use crate::services::SessionClaims;
use crate::AppState;

/// Reject requests without a valid session bearer token (401), and stash the
/// verified claims in request extensions for downstream layers.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request).ok_or_else(|| {
        AppError::Unauthorized(anyhow::anyhow!("Missing or invalid Authorization header"))
    })?;

    let claims = state
        .tokens
        .verify_session(token)
        .map_err(|_| AppError::Unauthorized(anyhow::anyhow!("Invalid or expired token")))?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Reject authenticated callers whose role claim is outside the admin set (403).
/// Must run after [`auth_middleware`].
pub async fn admin_only(request: Request, next: Next) -> Result<Response, AppError> {
    let claims = request
        .extensions()
        .get::<SessionClaims>()
        .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Missing session claims")))?;

    if AdminRole::parse(&claims.role).is_none() {
        return Err(AppError::Forbidden(anyhow::anyhow!(
            "Insufficient permissions"
        )));
    }

    Ok(next.run(request).await)
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
}
