//! Inventory domain models
//!
//! An inventory record tracks a single physical asset. Its relation graph
//! (model, brand, type, conditions, custom fields, attachments, purchase
//! documents) is loaded eagerly when the record is audited.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of an inventory record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InventoryStatus {
    Active,
    Inactive,
    Maintenance,
    Retired,
}

impl InventoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InventoryStatus::Active => "ACTIVE",
            InventoryStatus::Inactive => "INACTIVE",
            InventoryStatus::Maintenance => "MAINTENANCE",
            InventoryStatus::Retired => "RETIRED",
        }
    }

    /// Parse the database representation; unknown values fall back to ACTIVE.
    pub fn from_db(value: &str) -> Self {
        match value {
            "INACTIVE" => InventoryStatus::Inactive,
            "MAINTENANCE" => InventoryStatus::Maintenance,
            "RETIRED" => InventoryStatus::Retired,
            _ => InventoryStatus::Active,
        }
    }
}

impl fmt::Display for InventoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub model_id: Option<Uuid>,
    pub serial_number: Option<String>,
    pub active_number: Option<String>,
    pub status: InventoryStatus,
    pub comments: Option<String>,
    pub reception_date: Option<NaiveDate>,
    pub invoice_id: Option<Uuid>,
    pub purchase_order_id: Option<Uuid>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brand {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceType {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceModel {
    pub id: Uuid,
    pub name: String,
    pub brand_id: Option<Uuid>,
    pub device_type_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Uuid,
    pub code: String,
    pub issued_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: Uuid,
    pub code: String,
    pub issued_on: Option<NaiveDate>,
}

/// Physical condition tag (many-to-many with inventories)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    pub id: Uuid,
    pub name: String,
}

/// Value of a user-defined field attached to an inventory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomFieldValue {
    pub field_id: Uuid,
    pub name: String,
    pub value: String,
}

/// Uploaded image or document reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub id: Uuid,
    pub file_name: String,
}

/// An inventory record with its relation graph eagerly loaded
#[derive(Debug, Clone)]
pub struct InventoryGraph {
    pub record: InventoryRecord,
    pub model: Option<DeviceModel>,
    pub brand: Option<Brand>,
    pub device_type: Option<DeviceType>,
    pub conditions: Vec<Condition>,
    pub custom_fields: Vec<CustomFieldValue>,
    pub images: Vec<Attachment>,
    pub files: Vec<Attachment>,
    pub invoice: Option<Invoice>,
    pub purchase_order: Option<PurchaseOrder>,
}

/// Parameters for creating an inventory record
#[derive(Debug, Clone, Default)]
pub struct NewInventory {
    pub model_id: Option<Uuid>,
    pub serial_number: Option<String>,
    pub active_number: Option<String>,
    pub status: Option<InventoryStatus>,
    pub comments: Option<String>,
    pub reception_date: Option<NaiveDate>,
    pub invoice_id: Option<Uuid>,
    pub purchase_order_id: Option<Uuid>,
    pub condition_ids: Vec<Uuid>,
    pub custom_fields: Vec<(Uuid, String)>,
}

/// Partial update of an inventory record; `None` fields are left unchanged.
/// `condition_ids` / `custom_fields` replace the full relation set when present.
#[derive(Debug, Clone, Default)]
pub struct InventoryUpdate {
    pub model_id: Option<Option<Uuid>>,
    pub serial_number: Option<Option<String>>,
    pub active_number: Option<Option<String>>,
    pub status: Option<InventoryStatus>,
    pub comments: Option<Option<String>>,
    pub reception_date: Option<Option<NaiveDate>>,
    pub invoice_id: Option<Option<Uuid>>,
    pub purchase_order_id: Option<Option<Uuid>>,
    pub condition_ids: Option<Vec<Uuid>>,
    pub custom_fields: Option<Vec<(Uuid, String)>>,
}

impl InventoryUpdate {
    pub fn is_empty(&self) -> bool {
        self.model_id.is_none()
            && self.serial_number.is_none()
            && self.active_number.is_none()
            && self.status.is_none()
            && self.comments.is_none()
            && self.reception_date.is_none()
            && self.invoice_id.is_none()
            && self.purchase_order_id.is_none()
            && self.condition_ids.is_none()
            && self.custom_fields.is_none()
    }
}
