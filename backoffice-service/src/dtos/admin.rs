use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Dashboard counters for the admin back office.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    #[schema(example = 42)]
    pub products: u64,
    #[schema(example = 5)]
    pub categories: u64,
    #[schema(example = 17)]
    pub quotes: u64,
    #[schema(example = 3)]
    pub pending_quotes: u64,
}
