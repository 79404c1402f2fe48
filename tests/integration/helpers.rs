//! Shared test helpers for integration tests.
//!
//! Every `TestApp` owns a fresh in-memory store, so tests are independent
//! and need no external database.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use classroom_api::{AppState, build_app};
use classroom_auth::{AccessPolicy, PasswordHasher};
use classroom_core::config::{AppConfig, DatabaseBackend};
use classroom_database::Database;
use classroom_database::repositories::AccountRepository;
use classroom_entity::user::{NewAccount, Role};

pub const PASSWORD: &str = "password123";

/// Configuration used by every integration test.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = "integration-test-secret".to_string();
    config.database.backend = DatabaseBackend::Memory;
    config
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Store behind the router, for direct checks
    pub database: Database,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self::build(config, AccessPolicy::standard())
    }

    pub fn with_policy(policy: AccessPolicy) -> Self {
        Self::build(test_config(), policy)
    }

    fn build(config: AppConfig, policy: AccessPolicy) -> Self {
        let database = Database::memory();
        let state = AppState::with_policy(config, database.clone(), policy);
        Self {
            router: build_app(state),
            database,
        }
    }

    /// Insert an account directly, bypassing the API. Returns its id.
    pub async fn create_test_user(&self, username: &str, role: Role) -> i64 {
        let mut tx = self
            .database
            .begin(std::time::Duration::from_secs(30))
            .await
            .expect("Failed to open transaction");
        let account = AccountRepository::create(
            &mut tx,
            &NewAccount {
                username: username.to_string(),
                email: format!("{username}@school.test"),
                password_hash: PasswordHasher.hash(PASSWORD).expect("Failed to hash"),
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                role,
            },
        )
        .await
        .expect("Failed to create test user");
        tx.commit().await.expect("Failed to commit test user");
        account.id
    }

    /// Log in and return the response body.
    pub async fn login(&self, username: &str, password: &str) -> TestResponse {
        self.request(
            "POST",
            "/api/v1/auth/login",
            Some(serde_json::json!({
                "username": username,
                "password": password,
            })),
            None,
        )
        .await
    }

    /// Log in and return the (access, refresh) tokens.
    pub async fn tokens(&self, username: &str) -> (String, String) {
        let response = self.login(username, PASSWORD).await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {:?}", response.body);
        (response.str("access_token"), response.str("refresh_token"))
    }

    /// Register through the API and return the (access, refresh) tokens.
    pub async fn register(&self, username: &str) -> (String, String) {
        let response = self
            .request(
                "POST",
                "/api/v1/auth/register",
                Some(serde_json::json!({
                    "username": username,
                    "email": format!("{username}@school.test"),
                    "password": PASSWORD,
                    "first_name": "Ada",
                    "last_name": "Lovelace",
                })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "register failed: {:?}", response.body);
        (response.str("access_token"), response.str("refresh_token"))
    }

    /// Make a request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        send(&self.router, req).await
    }
}

/// Drive one request through `router`.
pub async fn send(router: &Router, req: Request<Body>) -> TestResponse {
    let response = router
        .clone()
        .oneshot(req)
        .await
        .expect("Failed to send request");

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("Failed to read body");

    let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

    TestResponse { status, body }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body (`Null` when empty or not JSON)
    pub body: Value,
}

impl TestResponse {
    /// String field of the body.
    pub fn str(&self, field: &str) -> String {
        self.body
            .get(field)
            .and_then(Value::as_str)
            .unwrap_or_else(|| panic!("missing '{field}' in {:?}", self.body))
            .to_string()
    }

    /// The error `reason` tag, if any.
    pub fn reason(&self) -> Option<&str> {
        self.body.get("reason").and_then(Value::as_str)
    }
}
