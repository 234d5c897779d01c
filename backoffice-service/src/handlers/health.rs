use service_core::axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::AppState;

/// Liveness and dependency health
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service healthy"),
        (status = 503, description = "A dependency is unavailable")
    ),
    tag = "Health"
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = state.credentials.health_check().await.is_ok();

    let status = if database { "ok" } else { "degraded" };
    let code = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        code,
        Json(json!({
            "status": status,
            "service": state.config.service_name,
            "version": env!("CARGO_PKG_VERSION"),
            "database": database,
        })),
    )
}
