pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use service_core::axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};
use service_core::middleware::{
    rate_limit::ip_rate_limit_middleware, security_headers::security_headers_middleware,
    tracing::request_id_middleware,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{openapi::security::SecurityScheme, Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::BackofficeConfig;
use crate::services::{AuthService, ContentStore, CredentialStore, EmailProvider, TokenService};
use std::sync::Arc;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health_check,
        handlers::auth::login,
        handlers::auth::forgot_password,
        handlers::auth::verify_otp,
        handlers::auth::reset_password,
        handlers::admin::stats,
    ),
    components(
        schemas(
            dtos::ErrorResponse,
            dtos::MessageResponse,
            dtos::auth::LoginRequest,
            dtos::auth::LoginResponse,
            dtos::auth::ForgotPasswordRequest,
            dtos::auth::VerifyOtpRequest,
            dtos::auth::VerifyOtpResponse,
            dtos::auth::ResetPasswordRequest,
            dtos::admin::CatalogStats,
            models::AdminView,
            models::AdminRole,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Admin login and password reset"),
        (name = "Admin", description = "Privileged back-office operations"),
        (name = "Health", description = "Service health"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: BackofficeConfig,
    pub credentials: Arc<dyn CredentialStore>,
    pub content: Arc<dyn ContentStore>,
    pub email: Arc<dyn EmailProvider>,
    pub tokens: TokenService,
    pub auth_service: AuthService,
    pub login_rate_limiter: service_core::middleware::rate_limit::IpRateLimiter,
    pub forgot_password_rate_limiter: service_core::middleware::rate_limit::IpRateLimiter,
    pub verify_otp_rate_limiter: service_core::middleware::rate_limit::IpRateLimiter,
    pub ip_rate_limiter: service_core::middleware::rate_limit::IpRateLimiter,
}

pub fn build_router(state: AppState) -> Router {
    // Login route with rate limiting
    let login_limiter = state.login_rate_limiter.clone();
    let login_route = Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .layer(from_fn_with_state(login_limiter, ip_rate_limit_middleware));

    // Forgot-password route with rate limiting
    let forgot_limiter = state.forgot_password_rate_limiter.clone();
    let forgot_route = Router::new()
        .route("/auth/forgot-password", post(handlers::auth::forgot_password))
        .layer(from_fn_with_state(forgot_limiter, ip_rate_limit_middleware));

    // Verify-otp route with rate limiting
    let verify_limiter = state.verify_otp_rate_limiter.clone();
    let verify_route = Router::new()
        .route("/auth/verify-otp", post(handlers::auth::verify_otp))
        .layer(from_fn_with_state(verify_limiter, ip_rate_limit_middleware));

    // Privileged routes: session auth first, then role check
    let admin_routes = Router::new()
        .route("/admin/stats", get(handlers::admin::stats))
        .layer(from_fn(middleware::admin_only))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    let ip_limiter = state.ip_rate_limiter.clone();

    let mut app = Router::new().route("/health", get(handlers::health::health_check));

    // Only add Swagger UI if enabled in config
    let swagger_enabled = match state.config.environment {
        crate::config::Environment::Dev => true,
        crate::config::Environment::Prod => {
            state.config.swagger.enabled == crate::config::SwaggerMode::Public
        }
    };

    if swagger_enabled {
        app =
            app.merge(SwaggerUi::new("/docs").url("/.well-known/openapi.json", ApiDoc::openapi()));
    } else {
        // Keep the OpenAPI JSON available for programmatic access
        app = app.route(
            "/.well-known/openapi.json",
            get(|| async { service_core::axum::Json(ApiDoc::openapi()) }),
        );
    }

    app.merge(login_route)
        .merge(forgot_route)
        .merge(verify_route)
        .merge(admin_routes)
        .route("/auth/reset-password", put(handlers::auth::reset_password))
        .with_state(state.clone())
        // Global IP rate limiting
        .layer(from_fn_with_state(ip_limiter, ip_rate_limit_middleware))
        // Tracing layer
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &service_core::axum::http::Request<_>| {
                let request_id = request
                    .extensions()
                    .get::<service_core::middleware::tracing::RequestId>()
                    .map(|id| id.as_str())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            },
        ))
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(
                    state
                        .config
                        .security
                        .allowed_origins
                        .iter()
                        .map(|o| {
                            o.parse::<service_core::axum::http::HeaderValue>()
                                .unwrap_or_else(|e| {
                                    tracing::error!(
                                        "Invalid CORS origin '{}': {}. Using fallback.",
                                        o,
                                        e
                                    );
                                    service_core::axum::http::HeaderValue::from_static("*")
                                })
                        })
                        .collect::<Vec<service_core::axum::http::HeaderValue>>(),
                )
                .allow_methods([
                    service_core::axum::http::Method::GET,
                    service_core::axum::http::Method::POST,
                    service_core::axum::http::Method::PUT,
                    service_core::axum::http::Method::DELETE,
                    service_core::axum::http::Method::OPTIONS,
                ])
                .allow_headers([
                    service_core::axum::http::header::AUTHORIZATION,
                    service_core::axum::http::header::CONTENT_TYPE,
                ]),
        )
}
