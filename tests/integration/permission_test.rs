//! Integration tests for role checks and record-level ownership.

mod helpers;

use http::StatusCode;

use classroom_auth::{AccessPolicy, Operation};
use classroom_entity::user::Role;

use helpers::{PASSWORD, TestApp};

fn new_user_body(username: &str, role: &str) -> serde_json::Value {
    serde_json::json!({
        "username": username,
        "email": format!("{username}@school.test"),
        "password": PASSWORD,
        "first_name": "New",
        "last_name": "Person",
        "role": role,
    })
}

#[tokio::test]
async fn test_user_cannot_call_admin_operation() {
    let app = TestApp::new();
    app.create_test_user("student1", Role::User).await;
    let (access, _) = app.tokens("student1").await;

    let response = app.request("GET", "/api/v1/users", None, Some(&access)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.reason(), Some("insufficient_role"));
}

#[tokio::test]
async fn test_admin_operation_commits() {
    let app = TestApp::new();
    app.create_test_user("teacher", Role::Admin).await;
    let (access, _) = app.tokens("teacher").await;

    let created = app
        .request(
            "POST",
            "/api/v1/users",
            Some(new_user_body("pupil", "student")),
            Some(&access),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.str("role"), "user");

    // Committed: visible to later requests and usable for login.
    let listed = app.request("GET", "/api/v1/users", None, Some(&access)).await;
    assert_eq!(listed.status, StatusCode::OK);
    let names: Vec<&str> = listed.body["users"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|u| u["username"].as_str())
        .collect();
    assert!(names.contains(&"pupil"));
    assert_eq!(app.login("pupil", PASSWORD).await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_forbidden_create_leaves_no_account() {
    let app = TestApp::new();
    app.create_test_user("teacher", Role::Admin).await;
    let (access, _) = app.tokens("teacher").await;

    let response = app
        .request(
            "POST",
            "/api/v1/users",
            Some(new_user_body("boss", "superadmin")),
            Some(&access),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.reason(), Some("role_escalation"));
    assert_eq!(app.login("boss", PASSWORD).await.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_superadmin_inherits_every_grant() {
    let app = TestApp::new();
    app.create_test_user("root", Role::SuperAdmin).await;
    let (access, _) = app.tokens("root").await;

    let list = app.request("GET", "/api/v1/users", None, Some(&access)).await;
    assert_eq!(list.status, StatusCode::OK);

    let me = app.request("GET", "/api/v1/auth/account", None, Some(&access)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.str("role"), "superadmin");
}

#[tokio::test]
async fn test_users_read_only_their_own_record() {
    let app = TestApp::new();
    let alice = app.create_test_user("alice", Role::User).await;
    let bob = app.create_test_user("bob", Role::User).await;
    let (access, _) = app.tokens("alice").await;

    let own = app
        .request("GET", &format!("/api/v1/users/{alice}"), None, Some(&access))
        .await;
    assert_eq!(own.status, StatusCode::OK);

    let other = app
        .request("GET", &format!("/api/v1/users/{bob}"), None, Some(&access))
        .await;
    assert_eq!(other.status, StatusCode::FORBIDDEN);
    assert_eq!(other.reason(), Some("not_owner"));
}

#[tokio::test]
async fn test_only_superadmin_changes_roles() {
    let app = TestApp::new();
    let alice = app.create_test_user("alice", Role::User).await;
    app.create_test_user("root", Role::SuperAdmin).await;
    let (alice_token, _) = app.tokens("alice").await;
    let (root_token, _) = app.tokens("root").await;
    let path = format!("/api/v1/users/{alice}");
    let promote = serde_json::json!({ "role": "admin" });

    let denied = app
        .request("PUT", &path, Some(promote.clone()), Some(&alice_token))
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
    assert_eq!(denied.reason(), Some("role_change"));

    let renamed = app
        .request(
            "PUT",
            &path,
            Some(serde_json::json!({ "first_name": "Alicia" })),
            Some(&alice_token),
        )
        .await;
    assert_eq!(renamed.status, StatusCode::OK);
    assert_eq!(renamed.str("first_name"), "Alicia");

    let promoted = app
        .request("PUT", &path, Some(promote), Some(&root_token))
        .await;
    assert_eq!(promoted.status, StatusCode::OK);
    assert_eq!(promoted.str("role"), "admin");
}

#[tokio::test]
async fn test_role_snapshot_survives_promotion_until_next_login() {
    let app = TestApp::new();
    let alice = app.create_test_user("alice", Role::User).await;
    app.create_test_user("root", Role::SuperAdmin).await;
    let (before, _) = app.tokens("alice").await;
    let (root_token, _) = app.tokens("root").await;

    app.request(
        "PUT",
        &format!("/api/v1/users/{alice}"),
        Some(serde_json::json!({ "role": "admin" })),
        Some(&root_token),
    )
    .await;

    let stale = app.request("GET", "/api/v1/users", None, Some(&before)).await;
    assert_eq!(stale.status, StatusCode::FORBIDDEN);

    let (after, _) = app.tokens("alice").await;
    let fresh = app.request("GET", "/api/v1/users", None, Some(&after)).await;
    assert_eq!(fresh.status, StatusCode::OK);
}

#[tokio::test]
async fn test_unmapped_operation_denied_even_for_superadmin() {
    let app = TestApp::with_policy(AccessPolicy::standard().revoke(Operation::ListUsers));
    app.create_test_user("root", Role::SuperAdmin).await;
    let (access, _) = app.tokens("root").await;

    let response = app.request("GET", "/api/v1/users", None, Some(&access)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.reason(), Some("unmapped_operation"));
}

#[tokio::test]
async fn test_list_users_pages_and_sorts() {
    let app = TestApp::new();
    app.create_test_user("admin", Role::Admin).await;
    for name in ["zed", "amy", "max"] {
        app.create_test_user(name, Role::User).await;
    }
    let (access, _) = app.tokens("admin").await;

    let response = app
        .request(
            "GET",
            "/api/v1/users?page=1&page_size=2&sort=username&order=asc",
            None,
            Some(&access),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let names: Vec<&str> = response.body["users"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|u| u["username"].as_str())
        .collect();
    assert_eq!(names, ["admin", "amy"]);

    let too_big = app
        .request("GET", "/api/v1/users?page_size=500", None, Some(&access))
        .await;
    assert_eq!(too_big.status, StatusCode::BAD_REQUEST);
}
