//! Signed, time-boxed tokens for two disjoint purposes: session
//! authentication and password-reset authorization.
//!
//! One algorithm (HS256, shared secret), distinguished by an explicit
//! `purpose` claim so a reset token can never stand in for a session token
//! or vice versa. Tokens are stateless: there is no server-side record and
//! no revocation before natural expiry.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;
use crate::models::AdminRole;

pub const SESSION_PURPOSE: &str = "session";
pub const RESET_PURPOSE: &str = "password-reset";

/// Reset capability window. Deliberately short; see DESIGN.md.
pub const RESET_TOKEN_TTL_MINUTES: i64 = 15;

/// Uniform rejection: callers cannot learn whether the signature, expiry,
/// or purpose check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenRejected;

/// Claims carried by a session token (long-lived).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (admin ID)
    pub sub: String,
    /// Role at issue time; the auth gate trusts this claim.
    pub role: String,
    /// Purpose marker, always [`SESSION_PURPOSE`]
    pub purpose: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Claims carried by a password-reset token (short-lived).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetClaims {
    pub sub: String,
    /// Purpose marker, always [`RESET_PURPOSE`]
    pub purpose: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    session_expiry_days: i64,
}

impl TokenService {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            session_expiry_days: config.session_expiry_days,
        }
    }

    /// Issue a session token for an authenticated admin.
    pub fn issue_session(&self, admin_id: &str, role: AdminRole) -> Result<String, anyhow::Error> {
        let now = Utc::now();
        let exp = now + Duration::days(self.session_expiry_days);

        let claims = SessionClaims {
            sub: admin_id.to_string(),
            role: role.as_str().to_string(),
            purpose: SESSION_PURPOSE.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| anyhow::anyhow!("Failed to encode session token: {}", e))
    }

    /// Issue a reset capability immediately after a successful OTP check.
    pub fn issue_reset(&self, admin_id: &str) -> Result<String, anyhow::Error> {
        let now = Utc::now();
        let exp = now + Duration::minutes(RESET_TOKEN_TTL_MINUTES);

        let claims = ResetClaims {
            sub: admin_id.to_string(),
            purpose: RESET_PURPOSE.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| anyhow::anyhow!("Failed to encode reset token: {}", e))
    }

    /// Verify a token presented as a session credential.
    pub fn verify_session(&self, token: &str) -> Result<SessionClaims, TokenRejected> {
        let claims = self.decode_claims::<SessionClaims>(token)?;
        if claims.purpose != SESSION_PURPOSE {
            return Err(TokenRejected);
        }
        Ok(claims)
    }

    /// Verify a token presented as a password-reset capability.
    pub fn verify_reset(&self, token: &str) -> Result<ResetClaims, TokenRejected> {
        let claims = self.decode_claims::<ResetClaims>(token)?;
        if claims.purpose != RESET_PURPOSE {
            return Err(TokenRejected);
        }
        Ok(claims)
    }

    fn decode_claims<T: serde::de::DeserializeOwned>(&self, token: &str) -> Result<T, TokenRejected> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        // No leeway: an expired token is expired.
        validation.leeway = 0;

        decode::<T>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| TokenRejected)
    }
}
