//! Authentication service
//!
//! Password hashing and user lookup. Passwords are hashed with Argon2 using a
//! per-password random salt.

use anyhow::{Context, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::db::{parse_db_timestamp, DbPool};
use crate::models::{default_organization_uuid, User};

pub struct AuthService {
    pool: DbPool,
}

impl AuthService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Hash a password for storage
    pub fn hash_password(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
            .to_string();
        Ok(password_hash)
    }

    /// Verify a password against a hash
    pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(password_hash)
            .map_err(|e| anyhow::anyhow!("Invalid password hash format: {}", e))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Authenticate a user by username and password
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>> {
        let user = self.get_user_by_username(username).await?;

        match user {
            Some(user) => {
                if Self::verify_password(password, &user.password_hash)? {
                    Ok(Some(user))
                } else {
                    Ok(None)
                }
            }
            None => Ok(None),
        }
    }

    /// Get a user by username
    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, organization_id, username, email, password_hash, role, created_at, updated_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch user by username")?;

        Ok(row.map(row_to_user))
    }

    /// Create a user account
    pub async fn create_user(
        &self,
        organization_id: Uuid,
        username: &str,
        email: &str,
        password: &str,
        role: &str,
    ) -> Result<User> {
        let password_hash = Self::hash_password(password)?;
        let user = User::new(
            organization_id,
            username.to_string(),
            email.to_string(),
            password_hash,
            role.to_string(),
        );

        sqlx::query(
            "INSERT INTO users (id, organization_id, username, email, password_hash, role, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user.id.to_string())
        .bind(user.organization_id.to_string())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.role)
        .bind(user.created_at.to_rfc3339())
        .bind(user.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to insert user")?;

        Ok(user)
    }

    /// Bootstrap the default admin account when the users table is empty.
    /// The password comes from configuration; without one a random password
    /// is generated and logged once so the instance is not left open.
    pub async fn ensure_admin_user(pool: &SqlitePool, config: &AuthConfig) -> Result<()> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await
            .context("Failed to count users")?;
        if count > 0 {
            return Ok(());
        }

        let org_id = default_organization_uuid();
        sqlx::query(
            "INSERT OR IGNORE INTO organizations (id, name, created_at) VALUES (?, ?, ?)",
        )
        .bind(org_id.to_string())
        .bind("Default")
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(pool)
        .await
        .context("Failed to insert default organization")?;

        let password = match &config.initial_admin_password {
            Some(password) => password.clone(),
            None => {
                let generated = generate_password();
                warn!(
                    "No initial_admin_password configured; generated admin password: {}",
                    generated
                );
                generated
            }
        };

        let service = AuthService::new(pool.clone());
        service
            .create_user(org_id, "admin", "admin@localhost", &password, "super_admin")
            .await?;
        info!("Bootstrapped default admin account");
        Ok(())
    }
}

fn generate_password() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghjkmnpqrstuvwxyz23456789";
    let mut rng = rand::thread_rng();
    (0..20)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: String,
    organization_id: String,
    username: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: String,
    updated_at: String,
}

fn row_to_user(row: UserRow) -> User {
    User {
        id: Uuid::parse_str(&row.id).unwrap_or_else(|_| Uuid::nil()),
        organization_id: Uuid::parse_str(&row.organization_id).unwrap_or_else(|_| Uuid::nil()),
        username: row.username,
        email: row.email,
        password_hash: row.password_hash,
        role: row.role,
        created_at: parse_db_timestamp(&row.created_at),
        updated_at: parse_db_timestamp(&row.updated_at),
    }
}
