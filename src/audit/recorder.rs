//! Audit recording flow
//!
//! Ties the snapshot builder, the diff, and the audit sink together: callers
//! capture a snapshot before mutating, mutate, capture again, and the
//! recorder persists the resulting changeset. CREATE and DELETE are stored as
//! the degenerate diffs against a missing side, so every entry carries the
//! same old/new payload shape.

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use super::diff::{diff, Changeset};
use super::snapshot::{Snapshot, SnapshotBuilder};
use super::store::{AuditSink, EntityStore, StoreUnavailable};
use crate::models::{AuditAction, AuditLogEntry};

/// Who performed the mutation being recorded
#[derive(Debug, Clone, Copy)]
pub struct AuditActor {
    pub organization_id: Uuid,
    pub user_id: Option<Uuid>,
}

pub struct AuditRecorder<S, A> {
    snapshots: SnapshotBuilder<S>,
    sink: A,
}

impl<S: EntityStore, A: AuditSink> AuditRecorder<S, A> {
    pub fn new(store: S, sink: A) -> Self {
        Self {
            snapshots: SnapshotBuilder::new(store),
            sink,
        }
    }

    /// Capture the current state of an entity; `None` when it does not exist.
    pub async fn snapshot(&self, entity_id: Uuid) -> Result<Option<Snapshot>, StoreUnavailable> {
        self.snapshots.build(entity_id).await
    }

    /// Record a creation: the changeset is the new state against nothing.
    pub async fn record_created(
        &self,
        actor: &AuditActor,
        entity_type: &str,
        entity_id: Uuid,
        after: Option<&Snapshot>,
    ) -> Result<AuditLogEntry> {
        let changeset = diff(None, after);
        self.append(actor, AuditAction::Create, entity_type, entity_id, changeset)
            .await
    }

    /// Record an update. An empty changeset means the mutation produced no
    /// observable change; no entry is persisted and `None` is returned.
    pub async fn record_updated(
        &self,
        actor: &AuditActor,
        entity_type: &str,
        entity_id: Uuid,
        before: Option<&Snapshot>,
        after: Option<&Snapshot>,
    ) -> Result<Option<AuditLogEntry>> {
        let changeset = diff(before, after);
        if changeset.is_empty() {
            debug!(%entity_id, entity_type, "update produced no observable change, skipping audit entry");
            return Ok(None);
        }
        let entry = self
            .append(actor, AuditAction::Update, entity_type, entity_id, changeset)
            .await?;
        Ok(Some(entry))
    }

    /// Record a deletion: the changeset is the old state against nothing.
    pub async fn record_deleted(
        &self,
        actor: &AuditActor,
        entity_type: &str,
        entity_id: Uuid,
        before: Option<&Snapshot>,
    ) -> Result<AuditLogEntry> {
        let changeset = diff(before, None);
        self.append(actor, AuditAction::Delete, entity_type, entity_id, changeset)
            .await
    }

    async fn append(
        &self,
        actor: &AuditActor,
        action: AuditAction,
        entity_type: &str,
        entity_id: Uuid,
        changeset: Changeset,
    ) -> Result<AuditLogEntry> {
        let entry = AuditLogEntry {
            id: Uuid::new_v4(),
            organization_id: actor.organization_id,
            user_id: actor.user_id,
            action,
            entity_type: entity_type.to_string(),
            entity_id: Some(entity_id.to_string()),
            changeset,
            created_at: Utc::now(),
        };
        self.sink
            .append(&entry)
            .await
            .context("Failed to append audit log entry")?;
        Ok(entry)
    }
}
