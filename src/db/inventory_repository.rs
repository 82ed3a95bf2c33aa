//! Inventory repository
//!
//! Persistence for inventory records and their relation graph. Fetching a
//! graph resolves the model/brand/type chain, condition tags, custom field
//! values, attachments, and purchase documents in one pass so the audit layer
//! can project a complete snapshot.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::audit::{EntityStore, StoreUnavailable};
use crate::db::{parse_db_timestamp, DbPool};
use crate::models::{
    Attachment, Brand, Condition, CustomFieldValue, DeviceModel, DeviceType, InventoryGraph,
    InventoryRecord, InventoryStatus, InventoryUpdate, Invoice, NewInventory, PurchaseOrder,
};

#[derive(Debug, sqlx::FromRow)]
struct InventoryRow {
    id: String,
    organization_id: String,
    model_id: Option<String>,
    serial_number: Option<String>,
    active_number: Option<String>,
    status: String,
    comments: Option<String>,
    reception_date: Option<String>,
    invoice_id: Option<String>,
    purchase_order_id: Option<String>,
    enabled: i64,
    created_at: String,
    updated_at: String,
}

#[derive(Debug, sqlx::FromRow)]
struct NamedRow {
    id: String,
    name: String,
}

#[derive(Debug, sqlx::FromRow)]
struct CodeRow {
    id: String,
    code: String,
    issued_on: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct ModelRow {
    id: String,
    name: String,
    brand_id: Option<String>,
    device_type_id: Option<String>,
}

pub struct InventoryRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> InventoryRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get an inventory record by id, regardless of its enabled flag.
    /// Soft-deleted records stay reachable here so deletions can be audited.
    pub async fn get(&self, id: Uuid) -> Result<Option<InventoryRecord>> {
        let row = sqlx::query_as::<_, InventoryRow>(
            "SELECT id, organization_id, model_id, serial_number, active_number, status, comments, reception_date, invoice_id, purchase_order_id, enabled, created_at, updated_at FROM inventories WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(self.pool)
        .await
        .context("Failed to fetch inventory")?;

        Ok(row.map(row_to_record))
    }

    /// List enabled inventories for an organization, newest first.
    pub async fn list(
        &self,
        organization_id: Uuid,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<InventoryRecord>> {
        let rows = sqlx::query_as::<_, InventoryRow>(
            "SELECT id, organization_id, model_id, serial_number, active_number, status, comments, reception_date, invoice_id, purchase_order_id, enabled, created_at, updated_at FROM inventories WHERE organization_id = ? AND enabled = 1 ORDER BY created_at DESC LIMIT ? OFFSET ?",
        )
        .bind(organization_id.to_string())
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(self.pool)
        .await
        .context("Failed to list inventories")?;

        Ok(rows.into_iter().map(row_to_record).collect())
    }

    /// Fetch an inventory with its relation graph eagerly loaded.
    pub async fn fetch_graph(&self, id: Uuid) -> Result<Option<InventoryGraph>> {
        let Some(record) = self.get(id).await? else {
            return Ok(None);
        };
        let id_str = record.id.to_string();

        let model_row = match &record.model_id {
            Some(model_id) => sqlx::query_as::<_, ModelRow>(
                "SELECT id, name, brand_id, device_type_id FROM device_models WHERE id = ?",
            )
            .bind(model_id.to_string())
            .fetch_optional(self.pool)
            .await
            .context("Failed to fetch device model")?,
            None => None,
        };

        let (model, brand, device_type) = match model_row {
            Some(row) => {
                let brand_id = row.brand_id.as_deref().and_then(|s| Uuid::parse_str(s).ok());
                let device_type_id = row
                    .device_type_id
                    .as_deref()
                    .and_then(|s| Uuid::parse_str(s).ok());

                let brand = match brand_id {
                    Some(brand_id) => self.fetch_named("brands", brand_id).await?,
                    None => None,
                };
                let device_type = match device_type_id {
                    Some(type_id) => self.fetch_named("device_types", type_id).await?,
                    None => None,
                };

                let model = DeviceModel {
                    id: parse_uuid(&row.id),
                    name: row.name,
                    brand_id,
                    device_type_id,
                };
                (
                    Some(model),
                    brand.map(|r| Brand {
                        id: parse_uuid(&r.id),
                        name: r.name,
                    }),
                    device_type.map(|r| DeviceType {
                        id: parse_uuid(&r.id),
                        name: r.name,
                    }),
                )
            }
            None => (None, None, None),
        };

        let conditions = sqlx::query_as::<_, NamedRow>(
            "SELECT c.id, c.name FROM inventory_conditions ic INNER JOIN conditions c ON c.id = ic.condition_id WHERE ic.inventory_id = ? ORDER BY c.name",
        )
        .bind(&id_str)
        .fetch_all(self.pool)
        .await
        .context("Failed to fetch inventory conditions")?
        .into_iter()
        .map(|r| Condition {
            id: parse_uuid(&r.id),
            name: r.name,
        })
        .collect();

        let custom_fields = sqlx::query_as::<_, (String, String, String)>(
            "SELECT cf.id, cf.name, icf.value FROM inventory_custom_fields icf INNER JOIN custom_fields cf ON cf.id = icf.custom_field_id WHERE icf.inventory_id = ? ORDER BY cf.name",
        )
        .bind(&id_str)
        .fetch_all(self.pool)
        .await
        .context("Failed to fetch inventory custom fields")?
        .into_iter()
        .map(|(field_id, name, value)| CustomFieldValue {
            field_id: parse_uuid(&field_id),
            name,
            value,
        })
        .collect();

        let images = self.fetch_attachments("inventory_images", &id_str).await?;
        let files = self.fetch_attachments("inventory_files", &id_str).await?;

        let invoice = match &record.invoice_id {
            Some(invoice_id) => self
                .fetch_code_row("invoices", *invoice_id)
                .await?
                .map(|r| Invoice {
                    id: parse_uuid(&r.id),
                    code: r.code,
                    issued_on: r.issued_on.as_deref().and_then(parse_date),
                }),
            None => None,
        };
        let purchase_order = match &record.purchase_order_id {
            Some(po_id) => self
                .fetch_code_row("purchase_orders", *po_id)
                .await?
                .map(|r| PurchaseOrder {
                    id: parse_uuid(&r.id),
                    code: r.code,
                    issued_on: r.issued_on.as_deref().and_then(parse_date),
                }),
            None => None,
        };

        Ok(Some(InventoryGraph {
            record,
            model,
            brand,
            device_type,
            conditions,
            custom_fields,
            images,
            files,
            invoice,
            purchase_order,
        }))
    }

    /// Create an inventory record and its relation rows in one transaction.
    pub async fn create(&self, organization_id: Uuid, new: &NewInventory) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let now = Utc::now().to_rfc3339();
        let status = new.status.unwrap_or(InventoryStatus::Active);

        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        sqlx::query(
            r#"
            INSERT INTO inventories (id, organization_id, model_id, serial_number, active_number, status, comments, reception_date, invoice_id, purchase_order_id, enabled, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(organization_id.to_string())
        .bind(new.model_id.map(|u| u.to_string()))
        .bind(new.serial_number.as_deref())
        .bind(new.active_number.as_deref())
        .bind(status.as_str())
        .bind(new.comments.as_deref())
        .bind(new.reception_date.map(|d| d.format("%Y-%m-%d").to_string()))
        .bind(new.invoice_id.map(|u| u.to_string()))
        .bind(new.purchase_order_id.map(|u| u.to_string()))
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .context("Failed to insert inventory")?;

        for condition_id in &new.condition_ids {
            sqlx::query(
                "INSERT INTO inventory_conditions (inventory_id, condition_id) VALUES (?, ?)",
            )
            .bind(id.to_string())
            .bind(condition_id.to_string())
            .execute(&mut *tx)
            .await
            .context("Failed to attach inventory condition")?;
        }

        for (field_id, value) in &new.custom_fields {
            sqlx::query(
                "INSERT INTO inventory_custom_fields (inventory_id, custom_field_id, value) VALUES (?, ?, ?)",
            )
            .bind(id.to_string())
            .bind(field_id.to_string())
            .bind(value)
            .execute(&mut *tx)
            .await
            .context("Failed to attach inventory custom field")?;
        }

        tx.commit().await.context("Failed to commit inventory")?;
        Ok(id)
    }

    /// Apply a partial update; relation sets are replaced when present.
    pub async fn update(&self, id: Uuid, update: &InventoryUpdate) -> Result<bool> {
        let Some(current) = self.get(id).await? else {
            return Ok(false);
        };
        let now = Utc::now().to_rfc3339();

        let model_id = update.model_id.unwrap_or(current.model_id);
        let serial_number = update
            .serial_number
            .clone()
            .unwrap_or(current.serial_number);
        let active_number = update
            .active_number
            .clone()
            .unwrap_or(current.active_number);
        let status = update.status.unwrap_or(current.status);
        let comments = update.comments.clone().unwrap_or(current.comments);
        let reception_date = update.reception_date.unwrap_or(current.reception_date);
        let invoice_id = update.invoice_id.unwrap_or(current.invoice_id);
        let purchase_order_id = update
            .purchase_order_id
            .unwrap_or(current.purchase_order_id);

        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        sqlx::query(
            r#"
            UPDATE inventories
            SET model_id = ?, serial_number = ?, active_number = ?, status = ?, comments = ?, reception_date = ?, invoice_id = ?, purchase_order_id = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(model_id.map(|u| u.to_string()))
        .bind(serial_number.as_deref())
        .bind(active_number.as_deref())
        .bind(status.as_str())
        .bind(comments.as_deref())
        .bind(reception_date.map(|d| d.format("%Y-%m-%d").to_string()))
        .bind(invoice_id.map(|u| u.to_string()))
        .bind(purchase_order_id.map(|u| u.to_string()))
        .bind(&now)
        .bind(id.to_string())
        .execute(&mut *tx)
        .await
        .context("Failed to update inventory")?;

        if let Some(condition_ids) = &update.condition_ids {
            sqlx::query("DELETE FROM inventory_conditions WHERE inventory_id = ?")
                .bind(id.to_string())
                .execute(&mut *tx)
                .await
                .context("Failed to clear inventory conditions")?;
            for condition_id in condition_ids {
                sqlx::query(
                    "INSERT INTO inventory_conditions (inventory_id, condition_id) VALUES (?, ?)",
                )
                .bind(id.to_string())
                .bind(condition_id.to_string())
                .execute(&mut *tx)
                .await
                .context("Failed to attach inventory condition")?;
            }
        }

        if let Some(custom_fields) = &update.custom_fields {
            sqlx::query("DELETE FROM inventory_custom_fields WHERE inventory_id = ?")
                .bind(id.to_string())
                .execute(&mut *tx)
                .await
                .context("Failed to clear inventory custom fields")?;
            for (field_id, value) in custom_fields {
                sqlx::query(
                    "INSERT INTO inventory_custom_fields (inventory_id, custom_field_id, value) VALUES (?, ?, ?)",
                )
                .bind(id.to_string())
                .bind(field_id.to_string())
                .bind(value)
                .execute(&mut *tx)
                .await
                .context("Failed to attach inventory custom field")?;
            }
        }

        tx.commit().await.context("Failed to commit inventory")?;
        Ok(true)
    }

    /// Soft delete: flips the enabled flag, the row stays in place.
    pub async fn soft_delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE inventories SET enabled = 0, updated_at = ? WHERE id = ? AND enabled = 1",
        )
        .bind(Utc::now().to_rfc3339())
        .bind(id.to_string())
        .execute(self.pool)
        .await
        .context("Failed to soft delete inventory")?;

        Ok(result.rows_affected() > 0)
    }

    async fn fetch_named(&self, table: &str, id: Uuid) -> Result<Option<NamedRow>> {
        let sql = format!("SELECT id, name FROM {table} WHERE id = ?");
        sqlx::query_as::<_, NamedRow>(&sql)
            .bind(id.to_string())
            .fetch_optional(self.pool)
            .await
            .with_context(|| format!("Failed to fetch {table} row"))
    }

    async fn fetch_code_row(&self, table: &str, id: Uuid) -> Result<Option<CodeRow>> {
        let sql = format!("SELECT id, code, issued_on FROM {table} WHERE id = ?");
        sqlx::query_as::<_, CodeRow>(&sql)
            .bind(id.to_string())
            .fetch_optional(self.pool)
            .await
            .with_context(|| format!("Failed to fetch {table} row"))
    }

    async fn fetch_attachments(&self, table: &str, inventory_id: &str) -> Result<Vec<Attachment>> {
        let sql = format!(
            "SELECT id, file_name FROM {table} WHERE inventory_id = ? ORDER BY created_at"
        );
        let rows = sqlx::query_as::<_, (String, String)>(&sql)
            .bind(inventory_id)
            .fetch_all(self.pool)
            .await
            .with_context(|| format!("Failed to fetch {table} rows"))?;
        Ok(rows
            .into_iter()
            .map(|(id, file_name)| Attachment {
                id: parse_uuid(&id),
                file_name,
            })
            .collect())
    }
}

/// Owned, clonable entity store handle backed by the SQL pool. This is the
/// concrete implementation of the audit layer's [`EntityStore`] seam.
#[derive(Clone)]
pub struct SqlEntityStore {
    pool: DbPool,
}

impl SqlEntityStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntityStore for SqlEntityStore {
    async fn fetch_inventory(&self, id: Uuid) -> Result<Option<InventoryGraph>, StoreUnavailable> {
        InventoryRepository::new(&self.pool)
            .fetch_graph(id)
            .await
            .map_err(StoreUnavailable::from)
    }
}

fn parse_uuid(value: &str) -> Uuid {
    Uuid::parse_str(value).unwrap_or_else(|_| Uuid::nil())
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

fn row_to_record(row: InventoryRow) -> InventoryRecord {
    InventoryRecord {
        id: parse_uuid(&row.id),
        organization_id: parse_uuid(&row.organization_id),
        model_id: row.model_id.as_deref().and_then(|s| Uuid::parse_str(s).ok()),
        serial_number: row.serial_number,
        active_number: row.active_number,
        status: InventoryStatus::from_db(&row.status),
        comments: row.comments,
        reception_date: row.reception_date.as_deref().and_then(parse_date),
        invoice_id: row
            .invoice_id
            .as_deref()
            .and_then(|s| Uuid::parse_str(s).ok()),
        purchase_order_id: row
            .purchase_order_id
            .as_deref()
            .and_then(|s| Uuid::parse_str(s).ok()),
        enabled: row.enabled != 0,
        created_at: parse_db_timestamp(&row.created_at),
        updated_at: parse_db_timestamp(&row.updated_at),
    }
}
