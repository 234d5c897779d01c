use backoffice_service::{
    build_router,
    config::BackofficeConfig,
    services::{
        AuthService, MongoContentStore, MongoCredentialStore, MongoDb, SmtpEmailService,
        TokenService,
    },
    AppState,
};
use service_core::middleware::rate_limit::create_ip_rate_limiter;
use service_core::observability::logging::init_tracing;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<(), service_core::error::AppError> {
    // Load configuration - fail fast if invalid
    let config = BackofficeConfig::from_env()?;

    init_tracing(&config.service_name, &config.log_level);

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
        "Starting back-office service"
    );

    // Initialize database connection and indexes
    let db = MongoDb::connect(&config.mongodb).await?;
    db.initialize_indexes().await?;
    tracing::info!("Database initialized successfully");

    let credentials = Arc::new(MongoCredentialStore::new(db.clone()));
    let content = Arc::new(MongoContentStore::new(db));

    let email = Arc::new(SmtpEmailService::new(&config.smtp).map_err(|e| {
        service_core::error::AppError::ConfigError(anyhow::anyhow!("SMTP setup failed: {}", e))
    })?);

    let tokens = TokenService::new(&config.jwt);

    // Rate limiters using shared logic
    let login_rate_limiter = create_ip_rate_limiter(
        config.rate_limit.login_attempts,
        config.rate_limit.login_window_seconds,
    );
    let forgot_password_rate_limiter = create_ip_rate_limiter(
        config.rate_limit.forgot_password_attempts,
        config.rate_limit.forgot_password_window_seconds,
    );
    let verify_otp_rate_limiter = create_ip_rate_limiter(
        config.rate_limit.verify_otp_attempts,
        config.rate_limit.verify_otp_window_seconds,
    );
    let ip_rate_limiter = create_ip_rate_limiter(
        config.rate_limit.global_ip_limit,
        config.rate_limit.global_ip_window_seconds,
    );

    let auth_service = AuthService::new(credentials.clone(), email.clone(), tokens.clone());

    let state = AppState {
        config: config.clone(),
        credentials,
        content,
        email,
        tokens,
        auth_service,
        login_rate_limiter,
        forgot_password_rate_limiter,
        verify_otp_rate_limiter,
        ip_rate_limiter,
    };

    let app = build_router(state);

    let addr = config.http.socket_addr();
    tracing::info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    service_core::axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Service shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
