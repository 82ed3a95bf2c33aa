//! API integration tests
//!
//! Health probes and authentication against a test server.

use crate::common::{fixtures, TestApp};
use sinabe_api::models::default_organization_uuid;

#[tokio::test]
async fn test_health_endpoint_returns_ok() {
    let app = TestApp::new().await;
    let response = app.get("/api/v1/health").await;

    response.assert_ok();

    let json: serde_json::Value = response.json();
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_detailed_health_endpoint() {
    let app = TestApp::new().await;
    let response = app.get("/api/v1/health/detailed").await;

    response.assert_ok();

    let json: serde_json::Value = response.json();
    assert_eq!(json["components"]["database"]["status"], "healthy");
}

#[tokio::test]
async fn test_liveness_probe() {
    let app = TestApp::new().await;
    app.get("/api/v1/health/live").await.assert_ok();
}

#[tokio::test]
async fn test_readiness_probe() {
    let app = TestApp::new().await;
    app.get("/api/v1/health/ready").await.assert_ok();
}

#[tokio::test]
async fn test_login_returns_token() {
    let app = TestApp::new().await;
    let org = fixtures::insert_organization(&app.state.db, "Acme").await;
    fixtures::insert_user(&app.state.db, org, "alice", "correct-horse-battery", "admin").await;

    let response = app
        .post_json(
            "/api/v1/auth/login",
            serde_json::json!({"username": "alice", "password": "correct-horse-battery"}),
        )
        .await;

    response.assert_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json["token_type"], "Bearer");
    assert!(!json["token"].as_str().unwrap().is_empty());
    assert_eq!(json["user"]["username"], "alice");
}

#[tokio::test]
async fn test_login_with_wrong_password_is_rejected() {
    let app = TestApp::new().await;
    let org = fixtures::insert_organization(&app.state.db, "Acme").await;
    fixtures::insert_user(&app.state.db, org, "alice", "correct-horse-battery", "admin").await;

    let response = app
        .post_json(
            "/api/v1/auth/login",
            serde_json::json!({"username": "alice", "password": "wrong"}),
        )
        .await;

    response.assert_status(401);
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let app = TestApp::new().await;
    let response = app.get("/api/v1/inventories").await;
    response.assert_status(401);
}

#[tokio::test]
async fn test_protected_route_rejects_garbage_token() {
    let app = TestApp::new().await;
    let response = app.get_auth("/api/v1/inventories", "not-a-jwt").await;
    response.assert_status(401);
}

#[tokio::test]
async fn test_protected_route_accepts_valid_token() {
    let app = TestApp::new().await;
    let token = app.token_for(
        uuid::Uuid::new_v4(),
        default_organization_uuid(),
        &["viewer"],
    );
    let response = app.get_auth("/api/v1/inventories", &token).await;
    response.assert_ok();
}
