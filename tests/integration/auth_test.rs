//! Integration tests for the session lifecycle.

mod helpers;

use http::StatusCode;

use classroom_core::config::RefreshPolicy;
use classroom_entity::user::Role;

use helpers::{PASSWORD, TestApp};

#[tokio::test]
async fn test_register_profile_logout_revokes() {
    let app = TestApp::new();
    let (access, _) = app.register("alice").await;

    let response = app
        .request("GET", "/api/v1/auth/account", None, Some(&access))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.str("username"), "alice");
    assert_eq!(response.str("role"), "user");
    assert!(response.body.get("password_hash").is_none());

    let response = app
        .request("DELETE", "/api/v1/auth/logout", None, Some(&access))
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = app
        .request("GET", "/api/v1/auth/account", None, Some(&access))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.reason(), Some("revoked_token"));
}

#[tokio::test]
async fn test_logout_also_kills_refresh_token() {
    let app = TestApp::new();
    let (access, refresh) = app.register("bob").await;

    app.request("DELETE", "/api/v1/auth/logout", None, Some(&access))
        .await;

    let response = app
        .request("POST", "/api/v1/auth/refresh-token", None, Some(&refresh))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.reason(), Some("revoked_token"));
}

#[tokio::test]
async fn test_second_logout_is_rejected() {
    let app = TestApp::new();
    let (access, _) = app.register("carol").await;

    let first = app
        .request("DELETE", "/api/v1/auth/logout", None, Some(&access))
        .await;
    assert_eq!(first.status, StatusCode::NO_CONTENT);

    let second = app
        .request("DELETE", "/api/v1/auth/logout", None, Some(&access))
        .await;
    assert_eq!(second.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_by_username_and_email() {
    let app = TestApp::new();
    app.create_test_user("dave", Role::User).await;

    let by_name = app.login("dave", PASSWORD).await;
    assert_eq!(by_name.status, StatusCode::OK);
    assert!(by_name.body.get("access_token").is_some());
    assert!(by_name.body["expires_in"].as_u64().is_some_and(|s| s > 0));

    let by_email = app
        .request(
            "POST",
            "/api/v1/auth/login",
            Some(serde_json::json!({
                "email": "dave@school.test",
                "password": PASSWORD,
            })),
            None,
        )
        .await;
    assert_eq!(by_email.status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::new();
    app.create_test_user("erin", Role::User).await;

    let wrong_password = app.login("erin", "not-the-password").await;
    let unknown_user = app.login("nobody", PASSWORD).await;

    for response in [&wrong_password, &unknown_user] {
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.reason(), Some("invalid_credentials"));
    }
    assert_eq!(wrong_password.body, unknown_user.body);
}

#[tokio::test]
async fn test_login_requires_an_identifier() {
    let app = TestApp::new();
    let response = app
        .request(
            "POST",
            "/api/v1/auth/login",
            Some(serde_json::json!({ "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.str("error"), "VALIDATION");
}

#[tokio::test]
async fn test_refresh_keeps_siblings_by_default() {
    let app = TestApp::new();
    let (old_access, refresh) = app.register("frank").await;

    let response = app
        .request("POST", "/api/v1/auth/refresh-token", None, Some(&refresh))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let new_access = response.str("access_token");
    assert_ne!(new_access, old_access);

    for token in [&old_access, &new_access] {
        let response = app
            .request("GET", "/api/v1/auth/account", None, Some(token))
            .await;
        assert_eq!(response.status, StatusCode::OK);
    }
}

#[tokio::test]
async fn test_refresh_can_revoke_previous() {
    let mut config = helpers::test_config();
    config.auth.refresh_policy = RefreshPolicy::RevokePrevious;
    let app = TestApp::with_config(config);
    let (old_access, refresh) = app.register("grace").await;

    let response = app
        .request("POST", "/api/v1/auth/refresh-token", None, Some(&refresh))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let new_access = response.str("access_token");

    let old = app
        .request("GET", "/api/v1/auth/account", None, Some(&old_access))
        .await;
    assert_eq!(old.status, StatusCode::UNAUTHORIZED);
    assert_eq!(old.reason(), Some("revoked_token"));

    let new = app
        .request("GET", "/api/v1/auth/account", None, Some(&new_access))
        .await;
    assert_eq!(new.status, StatusCode::OK);
}

#[tokio::test]
async fn test_token_kinds_are_not_interchangeable() {
    let app = TestApp::new();
    let (access, refresh) = app.register("heidi").await;

    let refresh_as_access = app
        .request("GET", "/api/v1/auth/account", None, Some(&refresh))
        .await;
    assert_eq!(refresh_as_access.status, StatusCode::UNAUTHORIZED);
    assert_eq!(refresh_as_access.reason(), Some("invalid_token"));

    let access_as_refresh = app
        .request("POST", "/api/v1/auth/refresh-token", None, Some(&access))
        .await;
    assert_eq!(access_as_refresh.status, StatusCode::UNAUTHORIZED);
    assert_eq!(access_as_refresh.reason(), Some("invalid_token"));
}

#[tokio::test]
async fn test_missing_and_garbage_credentials() {
    let app = TestApp::new();

    let missing = app.request("GET", "/api/v1/auth/account", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.reason(), Some("missing_credential"));

    let garbage = app
        .request("GET", "/api/v1/auth/account", None, Some("not.a.jwt"))
        .await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
    assert_eq!(garbage.reason(), Some("invalid_token"));
}

#[tokio::test]
async fn test_change_password() {
    let app = TestApp::new();
    let (access, _) = app.register("ivan").await;

    let wrong = app
        .request(
            "PUT",
            "/api/v1/auth/change-password",
            Some(serde_json::json!({
                "old_password": "guess",
                "new_password": "brand-new-secret",
            })),
            Some(&access),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong.reason(), Some("wrong_password"));

    let ok = app
        .request(
            "PUT",
            "/api/v1/auth/change-password",
            Some(serde_json::json!({
                "old_password": PASSWORD,
                "new_password": "brand-new-secret",
            })),
            Some(&access),
        )
        .await;
    assert_eq!(ok.status, StatusCode::OK);

    assert_eq!(app.login("ivan", PASSWORD).await.status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.login("ivan", "brand-new-secret").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_register_duplicate_username_conflicts() {
    let app = TestApp::new();
    app.register("judy").await;

    let response = app
        .request(
            "POST",
            "/api/v1/auth/register",
            Some(serde_json::json!({
                "username": "judy",
                "email": "other@school.test",
                "password": PASSWORD,
                "first_name": "Judy",
                "last_name": "Hopps",
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_validates_body() {
    let app = TestApp::new();

    let bad_fields = app
        .request(
            "POST",
            "/api/v1/auth/register",
            Some(serde_json::json!({
                "username": "k",
                "email": "not-an-email",
                "password": PASSWORD,
                "first_name": "Kim",
                "last_name": "Lee",
            })),
            None,
        )
        .await;
    assert_eq!(bad_fields.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_fields.reason(), Some("invalid_field"));

    let weak = app
        .request(
            "POST",
            "/api/v1/auth/register",
            Some(serde_json::json!({
                "username": "kim",
                "email": "kim@school.test",
                "password": "123",
                "first_name": "Kim",
                "last_name": "Lee",
            })),
            None,
        )
        .await;
    assert_eq!(weak.status, StatusCode::BAD_REQUEST);
    assert_eq!(weak.reason(), Some("weak_password"));

    // Neither attempt left an account behind.
    assert_eq!(app.login("kim", "123").await.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new();
    let response = app.request("GET", "/api/v1/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.str("status"), "ok");
    assert_eq!(response.str("database"), "memory");
}
