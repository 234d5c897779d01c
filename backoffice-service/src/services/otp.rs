//! One-time code generation for the password-reset flow.
//!
//! Codes are uniformly random 6-digit strings. Only a SHA-256 digest is
//! persisted; the plaintext exists exactly once, on its way to the email
//! sender. Consumption (verify-and-clear) is handled by the credential
//! store as one atomic operation.

use mongodb::bson;
use rand::Rng;
use sha2::{Digest, Sha256};

pub const OTP_LENGTH: usize = 6;
pub const OTP_TTL_MINUTES: i64 = 10;

/// A freshly issued code with its storable representation.
#[derive(Debug, Clone)]
pub struct IssuedOtp {
    /// Plaintext, handed to the notification sender once and then dropped.
    pub code: String,
    pub code_hash: String,
    pub expires_at: bson::DateTime,
}

/// Generate a new code valid for [`OTP_TTL_MINUTES`] from now.
pub fn issue() -> IssuedOtp {
    let code = generate_code();
    let code_hash = hash_code(&code);
    let expires_at = bson::DateTime::from_millis(
        bson::DateTime::now().timestamp_millis() + OTP_TTL_MINUTES * 60 * 1000,
    );
    IssuedOtp {
        code,
        code_hash,
        expires_at,
    }
}

/// Uniformly random, zero-padded numeric code.
pub fn generate_code() -> String {
    let n: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{:0width$}", n, width = OTP_LENGTH)
}

/// A code stays usable through its expiry instant, inclusive.
pub fn within_window(expires_at: bson::DateTime, now: bson::DateTime) -> bool {
    now <= expires_at
}

/// Digest used for storage and exact-match comparison.
pub fn hash_code(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    hex::encode(hasher.finalize())
}
