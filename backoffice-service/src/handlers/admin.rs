use service_core::{
    axum::{extract::State, http::StatusCode, response::IntoResponse, Json},
    error::AppError,
};

use crate::{
    dtos::{admin::CatalogStats, ErrorResponse},
    AppState,
};

/// Dashboard counters for the back office
#[utoipa::path(
    get,
    path = "/admin/stats",
    responses(
        (status = 200, description = "Catalog statistics", body = CatalogStats),
        (status = 401, description = "Missing or invalid session token", body = ErrorResponse),
        (status = 403, description = "Insufficient permissions", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn stats(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let stats = state.content.stats().await?;
    Ok((StatusCode::OK, Json(stats)))
}
