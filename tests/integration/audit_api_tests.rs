//! Audit trail integration tests
//!
//! Exercises the snapshot/diff/append flow end to end through the inventory
//! API and the audit log listing.

use uuid::Uuid;

use crate::common::{fixtures, TestApp};
use sinabe_api::models::default_organization_uuid;

async fn seeded_app() -> (TestApp, String) {
    let app = TestApp::new().await;
    fixtures::insert_default_organization(&app.state.db).await;
    let token = app.admin_token();
    (app, token)
}

async fn create_inventory(app: &TestApp, token: &str, body: serde_json::Value) -> String {
    let response = app.post_json_auth("/api/v1/inventories", body, token).await;
    response.assert_status(201);
    let json: serde_json::Value = response.json();
    json["id"].as_str().unwrap().to_string()
}

async fn audit_entries(app: &TestApp, token: &str) -> Vec<serde_json::Value> {
    let response = app.get_auth("/api/v1/audit-logs", token).await;
    response.assert_ok();
    response.json()
}

#[tokio::test]
async fn test_create_writes_audit_entry_with_na_old_side() {
    let (app, token) = seeded_app().await;
    let id = create_inventory(
        &app,
        &token,
        serde_json::json!({"serial_number": "SN-1", "comments": "boxed"}),
    )
    .await;

    let entries = audit_entries(&app, &token).await;
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry["action"], "CREATE");
    assert_eq!(entry["entity_type"], "inventory");
    assert_eq!(entry["entity_id"], id);
    assert_eq!(entry["changeset"]["serial_number"]["old"], "N/A");
    assert_eq!(entry["changeset"]["serial_number"]["new"], "SN-1");
    assert_eq!(entry["changeset"]["comments"]["new"], "boxed");
}

#[tokio::test]
async fn test_update_writes_only_changed_fields() {
    let (app, token) = seeded_app().await;
    let id = create_inventory(
        &app,
        &token,
        serde_json::json!({"serial_number": "SN-1", "comments": "old text"}),
    )
    .await;

    app.put_json_auth(
        &format!("/api/v1/inventories/{}", id),
        serde_json::json!({"comments": "new text"}),
        &token,
    )
    .await
    .assert_ok();

    let entries = audit_entries(&app, &token).await;
    let update = entries
        .iter()
        .find(|e| e["action"] == "UPDATE")
        .expect("No UPDATE entry");
    let changeset = update["changeset"].as_object().unwrap();
    assert_eq!(changeset.len(), 1);
    assert_eq!(changeset["comments"]["old"], "old text");
    assert_eq!(changeset["comments"]["new"], "new text");
}

#[tokio::test]
async fn test_noop_update_writes_no_entry() {
    let (app, token) = seeded_app().await;
    let id = create_inventory(
        &app,
        &token,
        serde_json::json!({"serial_number": "SN-1", "comments": "same"}),
    )
    .await;

    app.put_json_auth(
        &format!("/api/v1/inventories/{}", id),
        serde_json::json!({"comments": "same"}),
        &token,
    )
    .await
    .assert_ok();

    let entries = audit_entries(&app, &token).await;
    assert!(entries.iter().all(|e| e["action"] != "UPDATE"));
}

#[tokio::test]
async fn test_reordering_conditions_writes_no_entry() {
    let (app, token) = seeded_app().await;
    let boxed = fixtures::insert_condition(&app.state.db, "Boxed").await;
    let scratched = fixtures::insert_condition(&app.state.db, "Scratched").await;

    let id = create_inventory(
        &app,
        &token,
        serde_json::json!({"serial_number": "SN-1", "condition_ids": [boxed, scratched]}),
    )
    .await;

    // Same membership, reversed order: the sorted join makes this a no-op.
    app.put_json_auth(
        &format!("/api/v1/inventories/{}", id),
        serde_json::json!({"condition_ids": [scratched, boxed]}),
        &token,
    )
    .await
    .assert_ok();

    let entries = audit_entries(&app, &token).await;
    assert!(entries.iter().all(|e| e["action"] != "UPDATE"));
}

#[tokio::test]
async fn test_changing_condition_membership_writes_entry() {
    let (app, token) = seeded_app().await;
    let boxed = fixtures::insert_condition(&app.state.db, "Boxed").await;
    let scratched = fixtures::insert_condition(&app.state.db, "Scratched").await;

    let id = create_inventory(
        &app,
        &token,
        serde_json::json!({"serial_number": "SN-1", "condition_ids": [boxed]}),
    )
    .await;

    app.put_json_auth(
        &format!("/api/v1/inventories/{}", id),
        serde_json::json!({"condition_ids": [boxed, scratched]}),
        &token,
    )
    .await
    .assert_ok();

    let entries = audit_entries(&app, &token).await;
    let update = entries
        .iter()
        .find(|e| e["action"] == "UPDATE")
        .expect("No UPDATE entry");
    assert_eq!(update["changeset"]["conditions"]["old"], "Boxed");
    assert_eq!(update["changeset"]["conditions"]["new"], "Boxed, Scratched");
}

#[tokio::test]
async fn test_delete_writes_entry_with_na_new_side() {
    let (app, token) = seeded_app().await;
    let id = create_inventory(
        &app,
        &token,
        serde_json::json!({"serial_number": "SN-1"}),
    )
    .await;

    app.delete_auth(&format!("/api/v1/inventories/{}", id), &token)
        .await
        .assert_status(204);

    let entries = audit_entries(&app, &token).await;
    let delete = entries
        .iter()
        .find(|e| e["action"] == "DELETE")
        .expect("No DELETE entry");
    assert_eq!(delete["changeset"]["serial_number"]["old"], "SN-1");
    assert_eq!(delete["changeset"]["serial_number"]["new"], "N/A");
}

#[tokio::test]
async fn test_resolved_relations_appear_as_display_names() {
    let (app, token) = seeded_app().await;
    let brand = fixtures::insert_brand(&app.state.db, "Lenovo").await;
    let device_type = fixtures::insert_device_type(&app.state.db, "Laptop").await;
    let model =
        fixtures::insert_model(&app.state.db, "ThinkPad T14", Some(brand), Some(device_type))
            .await;
    let invoice = fixtures::insert_invoice(&app.state.db, "INV-77").await;

    create_inventory(
        &app,
        &token,
        serde_json::json!({"model_id": model, "invoice_id": invoice}),
    )
    .await;

    let entries = audit_entries(&app, &token).await;
    let changeset = &entries[0]["changeset"];
    assert_eq!(changeset["model"]["new"], "ThinkPad T14");
    assert_eq!(changeset["brand"]["new"], "Lenovo");
    assert_eq!(changeset["type"]["new"], "Laptop");
    assert_eq!(changeset["invoice"]["new"], "INV-77");
    // Unset single relations are projected as the literal "N/A", so they
    // still show up in a creation changeset.
    assert_eq!(changeset["purchase_order"]["new"], "N/A");
}

#[tokio::test]
async fn test_custom_fields_project_name_and_value() {
    let (app, token) = seeded_app().await;
    let ram = fixtures::insert_custom_field(&app.state.db, "RAM").await;
    let color = fixtures::insert_custom_field(&app.state.db, "Color").await;
    let po = fixtures::insert_purchase_order(&app.state.db, "PO-9").await;

    create_inventory(
        &app,
        &token,
        serde_json::json!({
            "purchase_order_id": po,
            "custom_fields": [
                {"field_id": ram, "value": "32GB"},
                {"field_id": color, "value": "Black"}
            ]
        }),
    )
    .await;

    let entries = audit_entries(&app, &token).await;
    let changeset = &entries[0]["changeset"];
    assert_eq!(changeset["custom_fields"]["new"], "Color: Black, RAM: 32GB");
    assert_eq!(changeset["purchase_order"]["new"], "PO-9");
}

#[tokio::test]
async fn test_audit_listing_requires_privileged_role() {
    let (app, _token) = seeded_app().await;
    let viewer = app.token_for(Uuid::new_v4(), default_organization_uuid(), &["viewer"]);
    app.get_auth("/api/v1/audit-logs", &viewer)
        .await
        .assert_status(403);

    let auditor = app.token_for(Uuid::new_v4(), default_organization_uuid(), &["auditor"]);
    app.get_auth("/api/v1/audit-logs", &auditor)
        .await
        .assert_ok();
}

#[tokio::test]
async fn test_cross_org_query_requires_super_admin() {
    let (app, token) = seeded_app().await;
    let other_org = Uuid::new_v4();

    app.get_auth(
        &format!("/api/v1/audit-logs?organization_id={}", other_org),
        &token,
    )
    .await
    .assert_status(403);

    let super_admin = app.token_for(
        Uuid::new_v4(),
        default_organization_uuid(),
        &["super_admin"],
    );
    app.get_auth(
        &format!("/api/v1/audit-logs?organization_id={}", other_org),
        &super_admin,
    )
    .await
    .assert_ok();
}

#[tokio::test]
async fn test_entity_id_filter() {
    let (app, token) = seeded_app().await;
    let first = create_inventory(&app, &token, serde_json::json!({"serial_number": "SN-1"})).await;
    create_inventory(&app, &token, serde_json::json!({"serial_number": "SN-2"})).await;

    let response = app
        .get_auth(&format!("/api/v1/audit-logs?entity_id={}", first), &token)
        .await;
    response.assert_ok();
    let entries: Vec<serde_json::Value> = response.json();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["entity_id"], first);
}
