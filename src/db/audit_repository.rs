//! Audit log repository
//!
//! Append-only store for audit entries. Implements the audit layer's
//! [`AuditSink`] seam so the recorder never touches SQL directly.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::audit::{AuditSink, Changeset};
use crate::db::parse_db_timestamp;
use crate::models::{AuditAction, AuditLogEntry, AuditLogQuery};

#[derive(Debug, sqlx::FromRow)]
struct AuditRow {
    id: String,
    organization_id: String,
    user_id: Option<String>,
    action: String,
    entity_type: String,
    entity_id: Option<String>,
    changeset: Option<String>,
    created_at: String,
}

pub struct AuditRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AuditRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, entry: &AuditLogEntry) -> Result<()> {
        let changeset = serde_json::to_string(&entry.changeset)
            .context("Failed to serialize audit changeset")?;

        sqlx::query(
            r#"
            INSERT INTO audit_log (id, organization_id, user_id, action, entity_type, entity_id, changeset, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.id.to_string())
        .bind(entry.organization_id.to_string())
        .bind(entry.user_id.map(|u| u.to_string()))
        .bind(entry.action.as_str())
        .bind(&entry.entity_type)
        .bind(entry.entity_id.as_deref())
        .bind(&changeset)
        .bind(entry.created_at.to_rfc3339())
        .execute(self.pool)
        .await
        .context("Failed to insert audit log entry")?;

        Ok(())
    }

    /// List entries for an organization, newest first, with optional filters.
    pub async fn list(
        &self,
        organization_id: Uuid,
        query: &AuditLogQuery,
    ) -> Result<Vec<AuditLogEntry>> {
        let mut sql = String::from(
            "SELECT id, organization_id, user_id, action, entity_type, entity_id, changeset, created_at FROM audit_log WHERE organization_id = ?",
        );

        if query.user_id.is_some() {
            sql.push_str(" AND user_id = ?");
        }
        if query.entity_type.is_some() {
            sql.push_str(" AND entity_type = ?");
        }
        if query.entity_id.is_some() {
            sql.push_str(" AND entity_id = ?");
        }
        if query.action.is_some() {
            sql.push_str(" AND action = ?");
        }

        sql.push_str(" ORDER BY created_at DESC");

        if query.limit.is_some() {
            sql.push_str(" LIMIT ?");
        } else {
            sql.push_str(" LIMIT 100");
        }
        if query.offset.is_some() {
            sql.push_str(" OFFSET ?");
        }

        let mut q = sqlx::query_as::<_, AuditRow>(&sql).bind(organization_id.to_string());
        if let Some(user_id) = query.user_id {
            q = q.bind(user_id.to_string());
        }
        if let Some(ref entity_type) = query.entity_type {
            q = q.bind(entity_type);
        }
        if let Some(ref entity_id) = query.entity_id {
            q = q.bind(entity_id);
        }
        if let Some(action) = query.action {
            q = q.bind(action.as_str());
        }
        if let Some(limit) = query.limit {
            q = q.bind(limit as i64);
        }
        if let Some(offset) = query.offset {
            q = q.bind(offset as i64);
        }

        let rows = q
            .fetch_all(self.pool)
            .await
            .context("Failed to list audit logs")?;

        Ok(rows.into_iter().map(row_to_entry).collect())
    }
}

#[async_trait]
impl AuditSink for AuditRepository<'_> {
    async fn append(&self, entry: &AuditLogEntry) -> Result<()> {
        self.insert(entry).await
    }
}

fn row_to_entry(row: AuditRow) -> AuditLogEntry {
    AuditLogEntry {
        id: Uuid::parse_str(&row.id).unwrap_or_else(|_| Uuid::nil()),
        organization_id: Uuid::parse_str(&row.organization_id).unwrap_or_else(|_| Uuid::nil()),
        user_id: row.user_id.as_deref().and_then(|s| Uuid::parse_str(s).ok()),
        action: AuditAction::from_db(&row.action).unwrap_or(AuditAction::Update),
        entity_type: row.entity_type,
        entity_id: row.entity_id,
        changeset: row
            .changeset
            .as_deref()
            .and_then(|s| serde_json::from_str::<Changeset>(s).ok())
            .unwrap_or_default(),
        created_at: parse_db_timestamp(&row.created_at),
    }
}
