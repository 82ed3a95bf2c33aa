//! Flat entity snapshots
//!
//! A snapshot is a flat, human-readable projection of an entity at a point in
//! time: every field is a scalar string, relations are resolved to display
//! names, and multi-valued relations are sorted before joining so that
//! reordering a membership-equal relation never shows up as a change.
//! Snapshots are never persisted; only the changeset derived from two of them
//! is (see [`super::diff`]).

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::diff::MISSING_VALUE;
use super::store::{EntityStore, StoreUnavailable};
use crate::models::InventoryGraph;

/// Flat mapping from field name to an already-formatted display value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    fields: BTreeMap<String, String>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a direct scalar field.
    pub fn set(&mut self, field: &str, value: impl Into<String>) {
        self.fields.insert(field.to_string(), value.into());
    }

    /// Set an optional scalar field; absent values are omitted entirely.
    pub fn set_opt(&mut self, field: &str, value: Option<impl Into<String>>) {
        if let Some(value) = value {
            self.set(field, value);
        }
    }

    /// Set a single-relation field, resolving an absent relation to `"N/A"`.
    pub fn set_relation(&mut self, field: &str, display: Option<impl Into<String>>) {
        match display {
            Some(display) => self.set(field, display),
            None => self.set(field, MISSING_VALUE),
        }
    }

    /// Set a multi-relation field: one display string per item, sorted
    /// lexicographically, joined with `", "`. An empty relation yields an
    /// empty string, which the diff treats as absence.
    pub fn set_joined(&mut self, field: &str, mut items: Vec<String>) {
        items.sort();
        self.set(field, items.join(", "));
    }

    /// Set a date field truncated to the calendar day; absent dates are omitted.
    pub fn set_date(&mut self, field: &str, date: Option<NaiveDate>) {
        if let Some(date) = date {
            self.set(field, date.format("%Y-%m-%d").to_string());
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<const N: usize> From<[(&str, &str); N]> for Snapshot {
    fn from(pairs: [(&str, &str); N]) -> Self {
        let mut snapshot = Snapshot::new();
        for (field, value) in pairs {
            snapshot.set(field, value);
        }
        snapshot
    }
}

/// Project an inventory relation graph into a flat snapshot.
///
/// Pure: field derivation only, no I/O.
pub fn project_inventory(graph: &InventoryGraph) -> Snapshot {
    let mut snapshot = Snapshot::new();
    let record = &graph.record;

    snapshot.set_opt("serial_number", record.serial_number.clone());
    snapshot.set_opt("active_number", record.active_number.clone());
    snapshot.set("status", record.status.as_str());
    snapshot.set_opt("comments", record.comments.clone());
    snapshot.set_date("reception_date", record.reception_date);

    snapshot.set_relation("model", graph.model.as_ref().map(|m| m.name.clone()));
    snapshot.set_relation("brand", graph.brand.as_ref().map(|b| b.name.clone()));
    snapshot.set_relation("type", graph.device_type.as_ref().map(|t| t.name.clone()));
    snapshot.set_relation("invoice", graph.invoice.as_ref().map(|i| i.code.clone()));
    snapshot.set_relation(
        "purchase_order",
        graph.purchase_order.as_ref().map(|p| p.code.clone()),
    );

    snapshot.set_joined(
        "conditions",
        graph.conditions.iter().map(|c| c.name.clone()).collect(),
    );
    snapshot.set_joined(
        "custom_fields",
        graph
            .custom_fields
            .iter()
            .map(|f| format!("{}: {}", f.name, f.value))
            .collect(),
    );
    snapshot.set_joined(
        "images",
        graph.images.iter().map(|a| a.file_name.clone()).collect(),
    );
    snapshot.set_joined(
        "files",
        graph.files.iter().map(|a| a.file_name.clone()).collect(),
    );

    snapshot
}

/// Builds snapshots by fetching the entity graph through an [`EntityStore`].
pub struct SnapshotBuilder<S> {
    store: S,
}

impl<S: EntityStore> SnapshotBuilder<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Fetch the entity and project it. A missing entity yields `Ok(None)`,
    /// which callers treat as "no prior state".
    pub async fn build(&self, entity_id: Uuid) -> Result<Option<Snapshot>, StoreUnavailable> {
        let graph = self.store.fetch_inventory(entity_id).await?;
        Ok(graph.as_ref().map(project_inventory))
    }
}
