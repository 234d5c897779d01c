//! One-shot provisioning of the initial superadmin account.
//!
//! Idempotent: re-running against a database that already has the account
//! leaves it untouched.

use backoffice_service::{
    config::BackofficeConfig,
    models::{AdminIdentity, AdminRole},
    services::{CredentialStore, MongoCredentialStore, MongoDb},
    utils::{hash_password, Password},
};
use service_core::error::AppError;
use service_core::observability::logging::init_tracing;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = BackofficeConfig::from_env()?;
    init_tracing("seed", &config.log_level);

    let name = std::env::var("ADMIN_NAME").unwrap_or_else(|_| "Administrator".to_string());
    let email = std::env::var("ADMIN_EMAIL")
        .map_err(|_| AppError::ConfigError(anyhow::anyhow!("ADMIN_EMAIL is required")))?;
    let password = std::env::var("ADMIN_PASSWORD")
        .map_err(|_| AppError::ConfigError(anyhow::anyhow!("ADMIN_PASSWORD is required")))?;

    if password.len() < backoffice_service::services::MIN_PASSWORD_LENGTH {
        return Err(AppError::ConfigError(anyhow::anyhow!(
            "ADMIN_PASSWORD must be at least {} characters",
            backoffice_service::services::MIN_PASSWORD_LENGTH
        )));
    }

    let db = MongoDb::connect(&config.mongodb).await?;
    db.initialize_indexes().await?;

    let store = MongoCredentialStore::new(db);

    if store
        .find_by_email(&email)
        .await
        .map_err(|e| AppError::InternalError(anyhow::anyhow!(e.to_string())))?
        .is_some()
    {
        tracing::info!("Superadmin already exists, nothing to do");
        return Ok(());
    }

    let password_hash = hash_password(&Password::new(password))
        .map_err(AppError::InternalError)?
        .into_string();

    let admin = AdminIdentity::new(name, email, password_hash, AdminRole::Superadmin);
    store
        .insert(&admin)
        .await
        .map_err(|e| AppError::InternalError(anyhow::anyhow!(e.to_string())))?;

    tracing::info!(admin_id = %admin.id, "Superadmin created");
    Ok(())
}
