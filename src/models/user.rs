//! User account models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Organization every account belongs to when none is configured explicitly
pub fn default_organization_uuid() -> Uuid {
    Uuid::from_u128(0x5150_4c41_0000_0000_0000_0000_0000_0001)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        organization_id: Uuid,
        username: String,
        email: String,
        password_hash: String,
        role: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            organization_id,
            username,
            email,
            password_hash,
            role,
            created_at: now,
            updated_at: now,
        }
    }
}
