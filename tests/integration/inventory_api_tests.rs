//! Inventory API integration tests

use uuid::Uuid;

use crate::common::{fixtures, TestApp};
use sinabe_api::models::default_organization_uuid;

async fn seeded_app() -> (TestApp, String, Uuid) {
    let app = TestApp::new().await;
    let org = default_organization_uuid();
    fixtures::insert_default_organization(&app.state.db).await;
    let token = app.admin_token();
    (app, token, org)
}

#[tokio::test]
async fn test_create_inventory_returns_created_record() {
    let (app, token, _org) = seeded_app().await;
    let brand = fixtures::insert_brand(&app.state.db, "Lenovo").await;
    let device_type = fixtures::insert_device_type(&app.state.db, "Laptop").await;
    let model = fixtures::insert_model(&app.state.db, "ThinkPad T14", Some(brand), Some(device_type)).await;

    let response = app
        .post_json_auth(
            "/api/v1/inventories",
            serde_json::json!({
                "model_id": model,
                "serial_number": "SN-1001",
                "status": "ACTIVE",
                "comments": "first unit",
                "reception_date": "2024-03-07"
            }),
            &token,
        )
        .await;

    response.assert_status(201);
    let json: serde_json::Value = response.json();
    assert_eq!(json["serial_number"], "SN-1001");
    assert_eq!(json["status"], "ACTIVE");
    assert_eq!(json["enabled"], true);
}

#[tokio::test]
async fn test_list_returns_created_inventories() {
    let (app, token, _org) = seeded_app().await;

    for serial in ["SN-1", "SN-2"] {
        app.post_json_auth(
            "/api/v1/inventories",
            serde_json::json!({"serial_number": serial}),
            &token,
        )
        .await
        .assert_status(201);
    }

    let response = app.get_auth("/api/v1/inventories", &token).await;
    response.assert_ok();
    let json: Vec<serde_json::Value> = response.json();
    assert_eq!(json.len(), 2);
}

#[tokio::test]
async fn test_get_inventory_by_id() {
    let (app, token, _org) = seeded_app().await;
    let created: serde_json::Value = app
        .post_json_auth(
            "/api/v1/inventories",
            serde_json::json!({"serial_number": "SN-42"}),
            &token,
        )
        .await
        .json();

    let id = created["id"].as_str().unwrap();
    let response = app
        .get_auth(&format!("/api/v1/inventories/{}", id), &token)
        .await;
    response.assert_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json["serial_number"], "SN-42");
}

#[tokio::test]
async fn test_get_inventory_from_other_org_is_not_found() {
    let (app, token, _org) = seeded_app().await;
    let created: serde_json::Value = app
        .post_json_auth(
            "/api/v1/inventories",
            serde_json::json!({"serial_number": "SN-42"}),
            &token,
        )
        .await
        .json();
    let id = created["id"].as_str().unwrap();

    let other_org = fixtures::insert_organization(&app.state.db, "Other").await;
    let other_token = app.token_for(Uuid::new_v4(), other_org, &["admin"]);
    let response = app
        .get_auth(&format!("/api/v1/inventories/{}", id), &other_token)
        .await;
    response.assert_status(404);
}

#[tokio::test]
async fn test_update_changes_fields() {
    let (app, token, _org) = seeded_app().await;
    let created: serde_json::Value = app
        .post_json_auth(
            "/api/v1/inventories",
            serde_json::json!({"serial_number": "SN-42", "comments": "old text"}),
            &token,
        )
        .await
        .json();
    let id = created["id"].as_str().unwrap();

    let response = app
        .put_json_auth(
            &format!("/api/v1/inventories/{}", id),
            serde_json::json!({"comments": "new text"}),
            &token,
        )
        .await;
    response.assert_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json["comments"], "new text");
    // Absent fields stay unchanged
    assert_eq!(json["serial_number"], "SN-42");
}

#[tokio::test]
async fn test_update_with_null_clears_field() {
    let (app, token, _org) = seeded_app().await;
    let created: serde_json::Value = app
        .post_json_auth(
            "/api/v1/inventories",
            serde_json::json!({"serial_number": "SN-42", "comments": "old text"}),
            &token,
        )
        .await
        .json();
    let id = created["id"].as_str().unwrap();

    let response = app
        .put_json_auth(
            &format!("/api/v1/inventories/{}", id),
            serde_json::json!({"comments": null}),
            &token,
        )
        .await;
    response.assert_ok();
    let json: serde_json::Value = response.json();
    assert!(json["comments"].is_null());
}

#[tokio::test]
async fn test_delete_soft_deletes() {
    let (app, token, _org) = seeded_app().await;
    let created: serde_json::Value = app
        .post_json_auth(
            "/api/v1/inventories",
            serde_json::json!({"serial_number": "SN-42"}),
            &token,
        )
        .await
        .json();
    let id = created["id"].as_str().unwrap();

    app.delete_auth(&format!("/api/v1/inventories/{}", id), &token)
        .await
        .assert_status(204);

    // Gone from the API...
    app.get_auth(&format!("/api/v1/inventories/{}", id), &token)
        .await
        .assert_status(404);
    let list: Vec<serde_json::Value> = app.get_auth("/api/v1/inventories", &token).await.json();
    assert!(list.is_empty());

    // ...but the row is still there, disabled.
    let (enabled,): (i64,) =
        sqlx::query_as("SELECT enabled FROM inventories WHERE id = ?")
            .bind(id)
            .fetch_one(&app.state.db)
            .await
            .unwrap();
    assert_eq!(enabled, 0);
}

#[tokio::test]
async fn test_create_rejects_overlong_serial_number() {
    let (app, token, _org) = seeded_app().await;
    let response = app
        .post_json_auth(
            "/api/v1/inventories",
            serde_json::json!({"serial_number": "x".repeat(200)}),
            &token,
        )
        .await;
    response.assert_status(422);
}
