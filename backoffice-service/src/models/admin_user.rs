//! Administrator identity model.
//!
//! The pending password-reset OTP lives on the identity document itself, so
//! issuing, verifying, and clearing a code are each a single atomic
//! read-modify-write against one document.

use chrono::{DateTime, Utc};
use mongodb::bson;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Closed set of administrator roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AdminRole {
    Admin,
    Superadmin,
}

impl AdminRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminRole::Admin => "admin",
            AdminRole::Superadmin => "superadmin",
        }
    }

    /// Parse a role claim. Anything outside the closed set is rejected.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(AdminRole::Admin),
            "superadmin" => Some(AdminRole::Superadmin),
            _ => None,
        }
    }
}

/// Administrator identity document (collection `admin_users`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminIdentity {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    /// Unique lookup key; always stored lowercase.
    pub email: String,
    pub password_hash: String,
    pub role: AdminRole,
    /// SHA-256 hex of the pending reset code; absent when no reset is in flight.
    pub otp_code_hash: Option<String>,
    pub otp_expires_at: Option<bson::DateTime>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl AdminIdentity {
    pub fn new(name: String, email: String, password_hash: String, role: AdminRole) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            email: email.to_lowercase(),
            password_hash,
            role,
            otp_code_hash: None,
            otp_expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// True while an issued code is present and unexpired.
    pub fn has_live_otp(&self) -> bool {
        match (&self.otp_code_hash, self.otp_expires_at) {
            (Some(_), Some(expires_at)) => bson::DateTime::now() <= expires_at,
            _ => false,
        }
    }

    /// Public view without credential material.
    pub fn view(&self) -> AdminView {
        AdminView {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// Administrator as returned to clients (no sensitive fields).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminView {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: String,
    #[schema(example = "Admin")]
    pub name: String,
    #[schema(example = "admin@example.com")]
    pub email: String,
    pub role: AdminRole,
}
