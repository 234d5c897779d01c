pub mod auth;
pub mod content;
pub mod credential;
pub mod database;
pub mod email;
pub mod error;
pub mod otp;
pub mod tokens;

pub use auth::{AuthService, MIN_PASSWORD_LENGTH};
pub use content::{ContentStore, MemoryContentStore, MongoContentStore};
pub use credential::{CredentialStore, MemoryCredentialStore, MongoCredentialStore};
pub use database::MongoDb;
pub use email::{EmailProvider, MockEmailService, SmtpEmailService};
pub use error::ServiceError;
pub use otp::{IssuedOtp, OTP_LENGTH, OTP_TTL_MINUTES};
pub use tokens::{ResetClaims, SessionClaims, TokenService, RESET_TOKEN_TTL_MINUTES};
