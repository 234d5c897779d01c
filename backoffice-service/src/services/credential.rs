//! Persistence seam for administrator identities.
//!
//! The Mongo implementation expresses every OTP state change as a single
//! atomic document operation, so concurrent verify attempts can never both
//! succeed against the same code.

use mongodb::bson::{self, doc};
use service_core::async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use subtle::ConstantTimeEq;

use crate::models::AdminIdentity;
use crate::services::database::MongoDb;
use crate::services::error::ServiceError;

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<AdminIdentity>, ServiceError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<AdminIdentity>, ServiceError>;

    async fn insert(&self, admin: &AdminIdentity) -> Result<(), ServiceError>;

    /// Attach a pending reset code to the account, replacing any previous one.
    /// Returns false when no account matches the email.
    async fn set_pending_otp(
        &self,
        email: &str,
        code_hash: &str,
        expires_at: bson::DateTime,
    ) -> Result<bool, ServiceError>;

    /// Remove any pending reset code without consuming it.
    async fn clear_pending_otp(&self, email: &str) -> Result<(), ServiceError>;

    /// Verify-and-clear in one step: succeeds only if the stored code hash
    /// matches and has not expired, and leaves no pending code behind.
    /// A mismatch leaves the stored state untouched.
    async fn consume_pending_otp(
        &self,
        email: &str,
        code_hash: &str,
    ) -> Result<Option<AdminIdentity>, ServiceError>;

    /// Replace the password hash and drop any pending reset code.
    /// Returns false when no account matches the id.
    async fn reset_password(&self, id: &str, password_hash: &str) -> Result<bool, ServiceError>;

    async fn health_check(&self) -> Result<(), ServiceError>;
}

#[derive(Clone)]
pub struct MongoCredentialStore {
    db: MongoDb,
}

impl MongoCredentialStore {
    pub fn new(db: MongoDb) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CredentialStore for MongoCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<AdminIdentity>, ServiceError> {
        let admin = self
            .db
            .admin_users()
            .find_one(doc! { "email": email.to_lowercase() }, None)
            .await?;
        Ok(admin)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<AdminIdentity>, ServiceError> {
        let admin = self
            .db
            .admin_users()
            .find_one(doc! { "_id": id }, None)
            .await?;
        Ok(admin)
    }

    async fn insert(&self, admin: &AdminIdentity) -> Result<(), ServiceError> {
        self.db.admin_users().insert_one(admin, None).await?;
        Ok(())
    }

    async fn set_pending_otp(
        &self,
        email: &str,
        code_hash: &str,
        expires_at: bson::DateTime,
    ) -> Result<bool, ServiceError> {
        let result = self
            .db
            .admin_users()
            .update_one(
                doc! { "email": email.to_lowercase() },
                doc! {
                    "$set": {
                        "otp_code_hash": code_hash,
                        "otp_expires_at": expires_at,
                        "updated_at": bson::DateTime::now(),
                    }
                },
                None,
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn clear_pending_otp(&self, email: &str) -> Result<(), ServiceError> {
        self.db
            .admin_users()
            .update_one(
                doc! { "email": email.to_lowercase() },
                doc! {
                    "$unset": { "otp_code_hash": "", "otp_expires_at": "" },
                    "$set": { "updated_at": bson::DateTime::now() },
                },
                None,
            )
            .await?;
        Ok(())
    }

    async fn consume_pending_otp(
        &self,
        email: &str,
        code_hash: &str,
    ) -> Result<Option<AdminIdentity>, ServiceError> {
        let admin = self
            .db
            .admin_users()
            .find_one_and_update(
                doc! {
                    "email": email.to_lowercase(),
                    "otp_code_hash": code_hash,
                    // Inclusive: a code is good through its expiry instant.
                    "otp_expires_at": { "$gte": bson::DateTime::now() },
                },
                doc! {
                    "$unset": { "otp_code_hash": "", "otp_expires_at": "" },
                    "$set": { "updated_at": bson::DateTime::now() },
                },
                None,
            )
            .await?;
        Ok(admin)
    }

    async fn reset_password(&self, id: &str, password_hash: &str) -> Result<bool, ServiceError> {
        let result = self
            .db
            .admin_users()
            .update_one(
                doc! { "_id": id },
                doc! {
                    "$set": {
                        "password_hash": password_hash,
                        "updated_at": bson::DateTime::now(),
                    },
                    "$unset": { "otp_code_hash": "", "otp_expires_at": "" },
                },
                None,
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn health_check(&self) -> Result<(), ServiceError> {
        self.db
            .health_check()
            .await
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!(e.to_string())))
    }
}

/// In-memory store keyed by email, used in tests and local development.
#[derive(Default)]
pub struct MemoryCredentialStore {
    admins: Mutex<HashMap<String, AdminIdentity>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<AdminIdentity>, ServiceError> {
        let admins = self.admins.lock().unwrap();
        Ok(admins.get(&email.to_lowercase()).cloned())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<AdminIdentity>, ServiceError> {
        let admins = self.admins.lock().unwrap();
        Ok(admins.values().find(|a| a.id == id).cloned())
    }

    async fn insert(&self, admin: &AdminIdentity) -> Result<(), ServiceError> {
        let mut admins = self.admins.lock().unwrap();
        if admins.contains_key(&admin.email) {
            return Err(ServiceError::AdminAlreadyExists);
        }
        admins.insert(admin.email.clone(), admin.clone());
        Ok(())
    }

    async fn set_pending_otp(
        &self,
        email: &str,
        code_hash: &str,
        expires_at: bson::DateTime,
    ) -> Result<bool, ServiceError> {
        let mut admins = self.admins.lock().unwrap();
        match admins.get_mut(&email.to_lowercase()) {
            Some(admin) => {
                admin.otp_code_hash = Some(code_hash.to_string());
                admin.otp_expires_at = Some(expires_at);
                admin.updated_at = chrono::Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn clear_pending_otp(&self, email: &str) -> Result<(), ServiceError> {
        let mut admins = self.admins.lock().unwrap();
        if let Some(admin) = admins.get_mut(&email.to_lowercase()) {
            admin.otp_code_hash = None;
            admin.otp_expires_at = None;
            admin.updated_at = chrono::Utc::now();
        }
        Ok(())
    }

    async fn consume_pending_otp(
        &self,
        email: &str,
        code_hash: &str,
    ) -> Result<Option<AdminIdentity>, ServiceError> {
        let mut admins = self.admins.lock().unwrap();
        let Some(admin) = admins.get_mut(&email.to_lowercase()) else {
            return Ok(None);
        };

        let matches = match (&admin.otp_code_hash, admin.otp_expires_at) {
            (Some(stored), Some(expires_at)) => {
                bool::from(stored.as_bytes().ct_eq(code_hash.as_bytes()))
                    && crate::services::otp::within_window(expires_at, bson::DateTime::now())
            }
            _ => false,
        };

        if !matches {
            return Ok(None);
        }

        admin.otp_code_hash = None;
        admin.otp_expires_at = None;
        admin.updated_at = chrono::Utc::now();
        Ok(Some(admin.clone()))
    }

    async fn reset_password(&self, id: &str, password_hash: &str) -> Result<bool, ServiceError> {
        let mut admins = self.admins.lock().unwrap();
        match admins.values_mut().find(|a| a.id == id) {
            Some(admin) => {
                admin.password_hash = password_hash.to_string();
                admin.otp_code_hash = None;
                admin.otp_expires_at = None;
                admin.updated_at = chrono::Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn health_check(&self) -> Result<(), ServiceError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AdminRole;
    use crate::services::otp;

    fn sample_admin() -> AdminIdentity {
        AdminIdentity::new(
            "Admin".to_string(),
            "admin@example.com".to_string(),
            "$argon2id$stub".to_string(),
            AdminRole::Admin,
        )
    }

    #[tokio::test]
    async fn test_consume_is_one_shot() {
        let store = MemoryCredentialStore::new();
        store.insert(&sample_admin()).await.unwrap();

        let issued = otp::issue();
        store
            .set_pending_otp("admin@example.com", &issued.code_hash, issued.expires_at)
            .await
            .unwrap();

        let first = store
            .consume_pending_otp("admin@example.com", &issued.code_hash)
            .await
            .unwrap();
        assert!(first.is_some());

        let second = store
            .consume_pending_otp("admin@example.com", &issued.code_hash)
            .await
            .unwrap();
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn test_wrong_code_leaves_pending_otp_intact() {
        let store = MemoryCredentialStore::new();
        store.insert(&sample_admin()).await.unwrap();

        let issued = otp::issue();
        store
            .set_pending_otp("admin@example.com", &issued.code_hash, issued.expires_at)
            .await
            .unwrap();

        let miss = store
            .consume_pending_otp("admin@example.com", &otp::hash_code("000000"))
            .await
            .unwrap();
        assert!(miss.is_none());

        // The right code still works afterwards.
        let hit = store
            .consume_pending_otp("admin@example.com", &issued.code_hash)
            .await
            .unwrap();
        assert!(hit.is_some());
    }

    #[tokio::test]
    async fn test_reissue_replaces_previous_code() {
        let store = MemoryCredentialStore::new();
        store.insert(&sample_admin()).await.unwrap();

        let first = otp::issue();
        store
            .set_pending_otp("admin@example.com", &first.code_hash, first.expires_at)
            .await
            .unwrap();
        let second = otp::issue();
        store
            .set_pending_otp("admin@example.com", &second.code_hash, second.expires_at)
            .await
            .unwrap();

        let stale = store
            .consume_pending_otp("admin@example.com", &first.code_hash)
            .await
            .unwrap();
        // Could coincide if both random codes were equal; overwhelmingly unlikely.
        if first.code_hash != second.code_hash {
            assert!(stale.is_none());
        }

        let live = store
            .consume_pending_otp("admin@example.com", &second.code_hash)
            .await
            .unwrap();
        assert!(live.is_some());
    }

    #[tokio::test]
    async fn test_expired_code_rejected() {
        let store = MemoryCredentialStore::new();
        store.insert(&sample_admin()).await.unwrap();

        let issued = otp::issue();
        let already_expired =
            bson::DateTime::from_millis(bson::DateTime::now().timestamp_millis() - 1000);
        store
            .set_pending_otp("admin@example.com", &issued.code_hash, already_expired)
            .await
            .unwrap();

        let result = store
            .consume_pending_otp("admin@example.com", &issued.code_hash)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_reset_password_clears_pending_otp() {
        let store = MemoryCredentialStore::new();
        let admin = sample_admin();
        store.insert(&admin).await.unwrap();

        let issued = otp::issue();
        store
            .set_pending_otp("admin@example.com", &issued.code_hash, issued.expires_at)
            .await
            .unwrap();

        let updated = store.reset_password(&admin.id, "$argon2id$new").await.unwrap();
        assert!(updated);

        let reloaded = store.find_by_id(&admin.id).await.unwrap().unwrap();
        assert_eq!(reloaded.password_hash, "$argon2id$new");
        assert!(reloaded.otp_code_hash.is_none());
    }
}
