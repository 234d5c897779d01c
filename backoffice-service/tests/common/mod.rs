//! Shared test harness: the full router wired to in-memory stores and a
//! recording email sender, so tests exercise real HTTP semantics without
//! external services.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tower::util::ServiceExt;

use backoffice_service::{
    config::{
        BackofficeConfig, Environment, JwtConfig, MongoConfig, RateLimitConfig, SecurityConfig,
        SmtpConfig, SwaggerConfig, SwaggerMode,
    },
    models::{AdminIdentity, AdminRole},
    services::{
        AuthService, CredentialStore, EmailProvider, MemoryContentStore, MemoryCredentialStore,
        ServiceError, TokenService,
    },
    utils::{hash_password, Password},
    AppState,
};
use service_core::middleware::rate_limit::create_ip_rate_limiter;

pub const TEST_JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Email sender that records every delivery instead of sending.
#[derive(Default)]
pub struct RecordingEmailService {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingEmailService {
    pub fn last_code(&self) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .last()
            .map(|(_, code)| code.clone())
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[service_core::async_trait::async_trait]
impl EmailProvider for RecordingEmailService {
    async fn send_reset_code(&self, to_email: &str, code: &str) -> Result<(), ServiceError> {
        self.sent
            .lock()
            .unwrap()
            .push((to_email.to_string(), code.to_string()));
        Ok(())
    }
}

/// Email sender that always fails, for delivery-rollback tests.
pub struct FailingEmailService;

#[service_core::async_trait::async_trait]
impl EmailProvider for FailingEmailService {
    async fn send_reset_code(&self, _to_email: &str, _code: &str) -> Result<(), ServiceError> {
        Err(ServiceError::EmailDelivery("smtp unavailable".to_string()))
    }
}

pub struct TestApp {
    pub router: Router,
    pub credentials: Arc<MemoryCredentialStore>,
    pub email: Arc<RecordingEmailService>,
    pub tokens: TokenService,
}

fn test_config() -> BackofficeConfig {
    BackofficeConfig {
        http: service_core::config::HttpConfig::default(),
        environment: Environment::Dev,
        service_name: "backoffice-service".to_string(),
        service_version: "test".to_string(),
        log_level: "warn".to_string(),
        mongodb: MongoConfig {
            uri: "mongodb://unused:27017".to_string(),
            database: "unused".to_string(),
        },
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            session_expiry_days: 7,
        },
        smtp: SmtpConfig {
            host: "localhost".to_string(),
            port: 587,
            user: String::new(),
            password: String::new(),
            from: "no-reply@localhost".to_string(),
        },
        security: SecurityConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
        swagger: SwaggerConfig {
            enabled: SwaggerMode::Disabled,
        },
        rate_limit: RateLimitConfig {
            login_attempts: 1000,
            login_window_seconds: 60,
            forgot_password_attempts: 1000,
            forgot_password_window_seconds: 60,
            verify_otp_attempts: 1000,
            verify_otp_window_seconds: 60,
            global_ip_limit: 10_000,
            global_ip_window_seconds: 60,
        },
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with_email(Arc::new(RecordingEmailService::default())).await
}

pub async fn spawn_app_failing_email() -> TestApp {
    spawn_app_with_email(Arc::new(RecordingEmailService::default()))
        .await
        .with_failing_email()
}

async fn spawn_app_with_email(email: Arc<RecordingEmailService>) -> TestApp {
    let config = test_config();
    let credentials = Arc::new(MemoryCredentialStore::new());
    let content = Arc::new(MemoryContentStore::new());
    let tokens = TokenService::new(&config.jwt);

    let auth_service = AuthService::new(credentials.clone(), email.clone(), tokens.clone());

    let state = AppState {
        config: config.clone(),
        credentials: credentials.clone(),
        content,
        email: email.clone(),
        tokens: tokens.clone(),
        auth_service,
        login_rate_limiter: create_ip_rate_limiter(
            config.rate_limit.login_attempts,
            config.rate_limit.login_window_seconds,
        ),
        forgot_password_rate_limiter: create_ip_rate_limiter(
            config.rate_limit.forgot_password_attempts,
            config.rate_limit.forgot_password_window_seconds,
        ),
        verify_otp_rate_limiter: create_ip_rate_limiter(
            config.rate_limit.verify_otp_attempts,
            config.rate_limit.verify_otp_window_seconds,
        ),
        ip_rate_limiter: create_ip_rate_limiter(
            config.rate_limit.global_ip_limit,
            config.rate_limit.global_ip_window_seconds,
        ),
    };

    TestApp {
        router: backoffice_service::build_router(state),
        credentials,
        email,
        tokens,
    }
}

impl TestApp {
    fn with_failing_email(self) -> TestApp {
        let config = test_config();
        let tokens = TokenService::new(&config.jwt);
        let failing: Arc<FailingEmailService> = Arc::new(FailingEmailService);
        let auth_service =
            AuthService::new(self.credentials.clone(), failing.clone(), tokens.clone());

        let state = AppState {
            config: config.clone(),
            credentials: self.credentials.clone(),
            content: Arc::new(MemoryContentStore::new()),
            email: failing,
            tokens: tokens.clone(),
            auth_service,
            login_rate_limiter: create_ip_rate_limiter(1000, 60),
            forgot_password_rate_limiter: create_ip_rate_limiter(1000, 60),
            verify_otp_rate_limiter: create_ip_rate_limiter(1000, 60),
            ip_rate_limiter: create_ip_rate_limiter(10_000, 60),
        };

        TestApp {
            router: backoffice_service::build_router(state),
            credentials: self.credentials,
            email: self.email,
            tokens,
        }
    }

    /// Insert an admin account directly into the store.
    pub async fn seed_admin(&self, email: &str, password: &str, role: AdminRole) -> AdminIdentity {
        let password_hash = hash_password(&Password::new(password.to_string()))
            .expect("hash password")
            .into_string();
        let admin = AdminIdentity::new("Test Admin".to_string(), email.to_string(), password_hash, role);
        self.credentials.insert(&admin).await.expect("insert admin");
        admin
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        bearer: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);

        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .expect("build request"),
            None => builder.body(Body::empty()).expect("build request"),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router response");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("read body")
            .to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, json)
    }

    pub async fn post_json(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, path, Some(body), None).await
    }

    pub async fn put_json(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, path, Some(body), None).await
    }

    pub async fn get_with_bearer(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, path, None, token).await
    }
}
