//! Read-only catalog counters backing the admin dashboard.

use mongodb::bson::doc;
use service_core::async_trait::async_trait;
use std::sync::Mutex;

use crate::dtos::admin::CatalogStats;
use crate::services::database::MongoDb;
use crate::services::error::ServiceError;

#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn stats(&self) -> Result<CatalogStats, ServiceError>;

    async fn health_check(&self) -> Result<(), ServiceError>;
}

#[derive(Clone)]
pub struct MongoContentStore {
    db: MongoDb,
}

impl MongoContentStore {
    pub fn new(db: MongoDb) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ContentStore for MongoContentStore {
    async fn stats(&self) -> Result<CatalogStats, ServiceError> {
        let products = self.db.products().count_documents(None, None).await?;
        let categories = self.db.categories().count_documents(None, None).await?;
        let quotes = self.db.quote_requests().count_documents(None, None).await?;
        let pending_quotes = self
            .db
            .quote_requests()
            .count_documents(doc! { "status": "pending" }, None)
            .await?;

        Ok(CatalogStats {
            products,
            categories,
            quotes,
            pending_quotes,
        })
    }

    async fn health_check(&self) -> Result<(), ServiceError> {
        self.db
            .health_check()
            .await
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!(e.to_string())))
    }
}

/// Fixed counters for tests and local development.
#[derive(Default)]
pub struct MemoryContentStore {
    stats: Mutex<CatalogStats>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stats(stats: CatalogStats) -> Self {
        Self {
            stats: Mutex::new(stats),
        }
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn stats(&self) -> Result<CatalogStats, ServiceError> {
        Ok(self.stats.lock().unwrap().clone())
    }

    async fn health_check(&self) -> Result<(), ServiceError> {
        Ok(())
    }
}
