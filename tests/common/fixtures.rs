//! Test fixtures
//!
//! Helpers that seed catalog rows (brands, models, conditions, ...) directly
//! through the pool so API tests can reference them by id.

use chrono::Utc;
use uuid::Uuid;

use sinabe_api::{models::default_organization_uuid, services::AuthService, DbPool};

pub async fn insert_organization(db: &DbPool, name: &str) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO organizations (id, name, created_at) VALUES (?, ?, ?)")
        .bind(id.to_string())
        .bind(name)
        .bind(Utc::now().to_rfc3339())
        .execute(db)
        .await
        .expect("Failed to insert organization");
    id
}

/// Seed the well-known default organization (matching the id tokens from
/// `admin_token()` / `default_organization_uuid()` carry) so foreign-key
/// references from inventories and the audit log resolve.
pub async fn insert_default_organization(db: &DbPool) -> Uuid {
    let id = default_organization_uuid();
    sqlx::query("INSERT OR IGNORE INTO organizations (id, name, created_at) VALUES (?, ?, ?)")
        .bind(id.to_string())
        .bind("Default")
        .bind(Utc::now().to_rfc3339())
        .execute(db)
        .await
        .expect("Failed to insert default organization");
    id
}

pub async fn insert_brand(db: &DbPool, name: &str) -> Uuid {
    insert_named(db, "brands", name).await
}

pub async fn insert_device_type(db: &DbPool, name: &str) -> Uuid {
    insert_named(db, "device_types", name).await
}

pub async fn insert_condition(db: &DbPool, name: &str) -> Uuid {
    insert_named(db, "conditions", name).await
}

pub async fn insert_custom_field(db: &DbPool, name: &str) -> Uuid {
    insert_named(db, "custom_fields", name).await
}

pub async fn insert_model(
    db: &DbPool,
    name: &str,
    brand_id: Option<Uuid>,
    device_type_id: Option<Uuid>,
) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO device_models (id, name, brand_id, device_type_id) VALUES (?, ?, ?, ?)")
        .bind(id.to_string())
        .bind(name)
        .bind(brand_id.map(|u| u.to_string()))
        .bind(device_type_id.map(|u| u.to_string()))
        .execute(db)
        .await
        .expect("Failed to insert device model");
    id
}

pub async fn insert_invoice(db: &DbPool, code: &str) -> Uuid {
    insert_code_row(db, "invoices", code).await
}

pub async fn insert_purchase_order(db: &DbPool, code: &str) -> Uuid {
    insert_code_row(db, "purchase_orders", code).await
}

/// Create a user account with a known password; returns the user id.
pub async fn insert_user(
    db: &DbPool,
    organization_id: Uuid,
    username: &str,
    password: &str,
    role: &str,
) -> Uuid {
    let service = AuthService::new(db.clone());
    let user = service
        .create_user(
            organization_id,
            username,
            &format!("{}@example.com", username),
            password,
            role,
        )
        .await
        .expect("Failed to create user");
    user.id
}

async fn insert_named(db: &DbPool, table: &str, name: &str) -> Uuid {
    let id = Uuid::new_v4();
    let sql = format!("INSERT INTO {table} (id, name) VALUES (?, ?)");
    sqlx::query(&sql)
        .bind(id.to_string())
        .bind(name)
        .execute(db)
        .await
        .unwrap_or_else(|e| panic!("Failed to insert {table} row: {e}"));
    id
}

async fn insert_code_row(db: &DbPool, table: &str, code: &str) -> Uuid {
    let id = Uuid::new_v4();
    let sql = format!("INSERT INTO {table} (id, code, issued_on) VALUES (?, ?, ?)");
    sqlx::query(&sql)
        .bind(id.to_string())
        .bind(code)
        .bind("2024-01-15")
        .execute(db)
        .await
        .unwrap_or_else(|e| panic!("Failed to insert {table} row: {e}"));
    id
}
