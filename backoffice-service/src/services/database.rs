use mongodb::{
    bson::doc,
    options::{ClientOptions, IndexOptions},
    Client, Collection, Database, IndexModel,
};
use service_core::error::AppError;

use crate::config::MongoConfig;
use crate::models::AdminIdentity;

/// Shared MongoDB handle with typed collection accessors.
#[derive(Clone)]
pub struct MongoDb {
    database: Database,
}

impl MongoDb {
    pub async fn connect(config: &MongoConfig) -> Result<Self, AppError> {
        let mut options = ClientOptions::parse(&config.uri).await?;
        options.app_name = Some("backoffice-service".to_string());

        let client = Client::with_options(options)?;
        let database = client.database(&config.database);

        tracing::info!(database = %config.database, "Connected to MongoDB");

        Ok(Self { database })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        self.admin_users().create_index(email_index, None).await?;

        tracing::info!("MongoDB indexes initialized");
        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.database.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }

    pub fn admin_users(&self) -> Collection<AdminIdentity> {
        self.database.collection("admin_users")
    }

    pub fn products(&self) -> Collection<mongodb::bson::Document> {
        self.database.collection("products")
    }

    pub fn categories(&self) -> Collection<mongodb::bson::Document> {
        self.database.collection("categories")
    }

    pub fn quote_requests(&self) -> Collection<mongodb::bson::Document> {
        self.database.collection("quote_requests")
    }
}
