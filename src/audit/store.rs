//! External collaborator seams for the audit core
//!
//! The snapshot builder reads entity graphs through [`EntityStore`] and the
//! recorder appends entries through [`AuditSink`], so the whole audit flow is
//! testable against in-memory fakes.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{AuditLogEntry, InventoryGraph};

/// The entity store could not be reached. A missing entity is not an error;
/// it is reported as `Ok(None)` by [`EntityStore::fetch_inventory`].
#[derive(Debug, Error)]
#[error("entity store unavailable: {0}")]
pub struct StoreUnavailable(#[from] pub anyhow::Error);

/// Read side of the persistence store: fetch an entity by id with its
/// relation graph eagerly loaded.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn fetch_inventory(&self, id: Uuid) -> Result<Option<InventoryGraph>, StoreUnavailable>;
}

/// Append-only audit log store
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn append(&self, entry: &AuditLogEntry) -> anyhow::Result<()>;
}
