//! Authentication API endpoints

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    middleware::auth::create_access_token, services::AuthService, utils::AppError, AppState,
};

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 128))]
    pub username: String,
    #[validate(length(min = 1, max = 1024))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate()?;

    let auth_service = AuthService::new(state.db.clone());
    let user = auth_service
        .authenticate(&payload.username, &payload.password)
        .await
        .map_err(|e| {
            tracing::error!("Authentication failed: {}", e);
            AppError::internal("Authentication failed")
        })?
        .ok_or_else(|| AppError::Unauthorized("Invalid username or password".to_string()))?;

    let roles = vec![user.role.clone()];
    let token = create_access_token(
        &user.id,
        &user.organization_id,
        &user.username,
        &user.email,
        roles.clone(),
        &state.config.auth.jwt_secret,
        state.config.auth.token_expiry_hours,
    )
    .map_err(|e| {
        tracing::error!("Failed to create access token: {}", e);
        AppError::internal("Failed to create access token")
    })?;

    Ok(Json(AuthResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.config.auth.token_expiry_hours * 3600,
        user: UserInfo {
            id: user.id,
            organization_id: user.organization_id,
            username: user.username,
            email: user.email,
            roles,
        },
    }))
}
