//! Inventory API endpoints
//!
//! CRUD over inventory records. Every mutation runs through the audit
//! recorder: a snapshot is captured before and after the change and the
//! resulting changeset is appended to the audit log.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit::{AuditActor, AuditRecorder},
    db::{AuditRepository, InventoryRepository, SqlEntityStore},
    middleware::AuthUser,
    models::{InventoryRecord, InventoryStatus, InventoryUpdate, NewInventory},
    utils::AppError,
    AppState,
};

const ENTITY_TYPE: &str = "inventory";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_inventories).post(create_inventory))
        .route(
            "/{id}",
            get(get_inventory)
                .put(update_inventory)
                .delete(delete_inventory),
        )
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    limit: Option<u32>,
    offset: Option<u32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CustomFieldEntry {
    pub field_id: Uuid,
    #[validate(length(max = 1024))]
    pub value: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateInventoryRequest {
    pub model_id: Option<Uuid>,
    #[validate(length(max = 128))]
    pub serial_number: Option<String>,
    #[validate(length(max = 128))]
    pub active_number: Option<String>,
    pub status: Option<InventoryStatus>,
    #[validate(length(max = 4096))]
    pub comments: Option<String>,
    pub reception_date: Option<NaiveDate>,
    pub invoice_id: Option<Uuid>,
    pub purchase_order_id: Option<Uuid>,
    #[serde(default)]
    pub condition_ids: Vec<Uuid>,
    #[serde(default)]
    #[validate(nested)]
    pub custom_fields: Vec<CustomFieldEntry>,
}

/// Distinguishes an absent field (leave unchanged) from an explicit `null`
/// (clear the field) in PUT payloads.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

/// PUT payload; absent fields are left unchanged, `null` clears a field.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateInventoryRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub model_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "double_option")]
    pub serial_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub active_number: Option<Option<String>>,
    pub status: Option<InventoryStatus>,
    #[serde(default, deserialize_with = "double_option")]
    pub comments: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub reception_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub invoice_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "double_option")]
    pub purchase_order_id: Option<Option<Uuid>>,
    pub condition_ids: Option<Vec<Uuid>>,
    #[validate(nested)]
    pub custom_fields: Option<Vec<CustomFieldEntry>>,
}

fn recorder(state: &AppState) -> AuditRecorder<SqlEntityStore, AuditRepository<'_>> {
    AuditRecorder::new(
        SqlEntityStore::new(state.db.clone()),
        AuditRepository::new(&state.db),
    )
}

fn actor(auth_user: &AuthUser) -> AuditActor {
    AuditActor {
        organization_id: auth_user.organization_id,
        user_id: Some(auth_user.id),
    }
}

async fn list_inventories(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<InventoryRecord>>, AppError> {
    let repo = InventoryRepository::new(&state.db);
    let records = repo
        .list(
            auth_user.organization_id,
            query.limit.unwrap_or(100).min(500),
            query.offset.unwrap_or(0),
        )
        .await
        .map_err(|e| {
            tracing::error!("Failed to list inventories: {}", e);
            AppError::internal("Failed to list inventories")
        })?;
    Ok(Json(records))
}

async fn get_inventory(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<InventoryRecord>, AppError> {
    let repo = InventoryRepository::new(&state.db);
    let record = repo
        .get(id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch inventory {}: {}", id, e);
            AppError::internal("Failed to fetch inventory")
        })?
        .filter(|r| r.enabled && r.organization_id == auth_user.organization_id)
        .ok_or_else(|| AppError::not_found("Inventory not found"))?;
    Ok(Json(record))
}

async fn create_inventory(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateInventoryRequest>,
) -> Result<(StatusCode, Json<InventoryRecord>), AppError> {
    payload.validate()?;

    let new = NewInventory {
        model_id: payload.model_id,
        serial_number: payload.serial_number,
        active_number: payload.active_number,
        status: payload.status,
        comments: payload.comments,
        reception_date: payload.reception_date,
        invoice_id: payload.invoice_id,
        purchase_order_id: payload.purchase_order_id,
        condition_ids: payload.condition_ids,
        custom_fields: payload
            .custom_fields
            .into_iter()
            .map(|f| (f.field_id, f.value))
            .collect(),
    };

    let repo = InventoryRepository::new(&state.db);
    let id = repo
        .create(auth_user.organization_id, &new)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create inventory: {}", e);
            AppError::internal("Failed to create inventory")
        })?;

    let recorder = recorder(&state);
    let after = recorder.snapshot(id).await?;
    recorder
        .record_created(&actor(&auth_user), ENTITY_TYPE, id, after.as_ref())
        .await
        .map_err(|e| {
            tracing::error!("Failed to record inventory creation: {}", e);
            AppError::internal("Failed to record audit entry")
        })?;

    let record = repo
        .get(id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch created inventory: {}", e);
            AppError::internal("Failed to fetch created inventory")
        })?
        .ok_or_else(|| AppError::internal("Created inventory vanished"))?;

    Ok((StatusCode::CREATED, Json(record)))
}

async fn update_inventory(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateInventoryRequest>,
) -> Result<Json<InventoryRecord>, AppError> {
    payload.validate()?;

    let repo = InventoryRepository::new(&state.db);
    let current = repo
        .get(id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch inventory {}: {}", id, e);
            AppError::internal("Failed to fetch inventory")
        })?
        .filter(|r| r.enabled && r.organization_id == auth_user.organization_id)
        .ok_or_else(|| AppError::not_found("Inventory not found"))?;

    let update = InventoryUpdate {
        model_id: payload.model_id,
        serial_number: payload.serial_number,
        active_number: payload.active_number,
        status: payload.status,
        comments: payload.comments,
        reception_date: payload.reception_date,
        invoice_id: payload.invoice_id,
        purchase_order_id: payload.purchase_order_id,
        condition_ids: payload.condition_ids,
        custom_fields: payload
            .custom_fields
            .map(|fields| fields.into_iter().map(|f| (f.field_id, f.value)).collect()),
    };

    let recorder = recorder(&state);
    let before = recorder.snapshot(current.id).await?;

    repo.update(current.id, &update).await.map_err(|e| {
        tracing::error!("Failed to update inventory {}: {}", id, e);
        AppError::internal("Failed to update inventory")
    })?;

    let after = recorder.snapshot(current.id).await?;
    recorder
        .record_updated(
            &actor(&auth_user),
            ENTITY_TYPE,
            current.id,
            before.as_ref(),
            after.as_ref(),
        )
        .await
        .map_err(|e| {
            tracing::error!("Failed to record inventory update: {}", e);
            AppError::internal("Failed to record audit entry")
        })?;

    let record = repo
        .get(current.id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch updated inventory: {}", e);
            AppError::internal("Failed to fetch updated inventory")
        })?
        .ok_or_else(|| AppError::internal("Updated inventory vanished"))?;

    Ok(Json(record))
}

async fn delete_inventory(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let repo = InventoryRepository::new(&state.db);
    let current = repo
        .get(id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch inventory {}: {}", id, e);
            AppError::internal("Failed to fetch inventory")
        })?
        .filter(|r| r.enabled && r.organization_id == auth_user.organization_id)
        .ok_or_else(|| AppError::not_found("Inventory not found"))?;

    let recorder = recorder(&state);
    let before = recorder.snapshot(current.id).await?;

    repo.soft_delete(current.id).await.map_err(|e| {
        tracing::error!("Failed to delete inventory {}: {}", id, e);
        AppError::internal("Failed to delete inventory")
    })?;

    recorder
        .record_deleted(&actor(&auth_user), ENTITY_TYPE, current.id, before.as_ref())
        .await
        .map_err(|e| {
            tracing::error!("Failed to record inventory deletion: {}", e);
            AppError::internal("Failed to record audit entry")
        })?;

    Ok(StatusCode::NO_CONTENT)
}
