// Authentication data models and DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// User database model
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub full_name: Option<String>,
    pub hashed_password: String,
    pub is_maintainer: bool,
    pub is_root: bool,
    pub is_worker: bool,
}

/// User response model (excludes hashed_password)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub full_name: Option<String>,
    pub is_maintainer: bool,
    pub is_root: bool,
    pub is_worker: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            full_name: user.full_name,
            is_maintainer: user.is_maintainer,
            is_root: user.is_root,
            is_worker: user.is_worker,
        }
    }
}

/// Worker registration response, the only place a plaintext password is
/// ever echoed back (it is shown exactly once, at creation)
#[derive(Debug, Serialize, ToSchema)]
pub struct WorkerCredentials {
    #[serde(flatten)]
    pub user: UserResponse,
    pub password: String,
}

/// Login form, `application/x-www-form-urlencoded` per the OAuth2 password flow
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Token refresh request DTO
#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Registration request DTO
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 254))]
    pub username: String,
    #[validate(length(max = 32))]
    pub password: String,
}

/// Worker registration request DTO
#[derive(Debug, Deserialize, ToSchema)]
pub struct WorkerRegisterRequest {
    pub register_key: String,
    pub healthstack_id: i32,
}

/// Login/refresh response payload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenPair {
    pub token_type: String,
    pub access_token: String,
    pub expire_at: DateTime<Utc>,
    pub refresh_token: String,
    pub refresh_expire_at: DateTime<Utc>,
}
