// HTTP handlers for user self-service and administration

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::auth::{
    error::AuthError,
    middleware::{CurrentUser, MaintainerUser},
    models::UserResponse,
    password::PasswordService,
    repository::{PgUserStore, UserStore},
};
use crate::healthstack::models::Pagination;
use crate::users::models::{UserUpdate, UserUpdateAdmin};
use crate::AppState;

/// Get the calling user
/// GET /v1/users/me
#[utoipa::path(
    get,
    path = "/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 403, description = "Could not validate credentials")
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn read_user_me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(user.into())
}

/// Update the calling user. A new password runs through the strength policy.
/// PUT /v1/users/me
#[utoipa::path(
    put,
    path = "/v1/users/me",
    request_body = UserUpdate,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 404, description = "Password rejected by the strength policy")
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn update_user_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<UserUpdate>,
) -> Result<Json<UserResponse>, AuthError> {
    payload.validate()?;

    let hashed = match &payload.password {
        Some(password) => {
            if let Some(violation) = PasswordService::password_violation(password) {
                return Err(AuthError::WeakPassword(violation.to_string()));
            }
            Some(PasswordService::hash_password(password)?)
        }
        None => None,
    };

    let users = PgUserStore::new(state.db.clone());
    let updated = users
        .update_profile(
            user.id,
            hashed.as_deref(),
            payload.full_name.as_deref(),
            None,
            None,
        )
        .await?
        .ok_or(AuthError::AccountNotFound)?;
    Ok(Json(updated.into()))
}

/// Delete the calling user
/// DELETE /v1/users/me
#[utoipa::path(
    delete,
    path = "/v1/users/me",
    responses(
        (status = 204, description = "Account deleted"),
        (status = 403, description = "Could not validate credentials")
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn delete_user_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<StatusCode, AuthError> {
    let users = PgUserStore::new(state.db.clone());
    users.delete(user.id).await?;
    tracing::info!("User id={} deleted own account", user.id);
    Ok(StatusCode::NO_CONTENT)
}

/// List all users. Maintainer permission required.
/// GET /v1/users
#[utoipa::path(
    get,
    path = "/v1/users",
    params(Pagination),
    responses(
        (status = 200, description = "All users", body = Vec<UserResponse>),
        (status = 403, description = "Maintainer or root required")
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn read_all_users(
    State(state): State<AppState>,
    MaintainerUser(_user): MaintainerUser,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<UserResponse>>, AuthError> {
    let users = PgUserStore::new(state.db.clone());
    let all = users.list(page.offset, page.limit).await?;
    Ok(Json(all.into_iter().map(UserResponse::from).collect()))
}

/// Get a user by username. Maintainer permission required.
/// GET /v1/users/:username
#[utoipa::path(
    get,
    path = "/v1/users/{username}",
    params(("username" = String, Path, description = "Username")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 403, description = "Maintainer or root required"),
        (status = 404, description = "User not found")
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn read_user(
    State(state): State<AppState>,
    MaintainerUser(_user): MaintainerUser,
    Path(username): Path<String>,
) -> Result<Json<UserResponse>, AuthError> {
    let users = PgUserStore::new(state.db.clone());
    let user = users
        .find_by_username(&username)
        .await?
        .ok_or(AuthError::AccountNotFound)?;
    Ok(Json(user.into()))
}

/// Update another user. Maintainer permission required; granting or revoking
/// root is honored only when the caller is root.
/// PUT /v1/users/:username
#[utoipa::path(
    put,
    path = "/v1/users/{username}",
    params(("username" = String, Path, description = "Username")),
    request_body = UserUpdateAdmin,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 403, description = "Maintainer or root required"),
        (status = 404, description = "User not found, or password rejected")
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn update_other_user(
    State(state): State<AppState>,
    MaintainerUser(caller): MaintainerUser,
    Path(username): Path<String>,
    Json(payload): Json<UserUpdateAdmin>,
) -> Result<Json<UserResponse>, AuthError> {
    payload.validate()?;

    let users = PgUserStore::new(state.db.clone());
    let target = users
        .find_by_username(&username)
        .await?
        .ok_or(AuthError::AccountNotFound)?;

    let hashed = match &payload.password {
        Some(password) => {
            if let Some(violation) = PasswordService::password_violation(password) {
                return Err(AuthError::WeakPassword(violation.to_string()));
            }
            Some(PasswordService::hash_password(password)?)
        }
        None => None,
    };

    // Non-root callers cannot touch is_root; the rest of the update
    // still applies
    let is_root = if caller.is_root {
        payload.is_root
    } else {
        if payload.is_root.is_some() {
            tracing::warn!(
                "Maintainer id={} attempted to change is_root on user id={}",
                caller.id,
                target.id
            );
        }
        None
    };

    let updated = users
        .update_profile(
            target.id,
            hashed.as_deref(),
            payload.full_name.as_deref(),
            payload.is_maintainer,
            is_root,
        )
        .await?
        .ok_or(AuthError::AccountNotFound)?;
    Ok(Json(updated.into()))
}

/// Delete another user. Deleting a root account requires a root caller.
/// DELETE /v1/users/:username
#[utoipa::path(
    delete,
    path = "/v1/users/{username}",
    params(("username" = String, Path, description = "Username")),
    responses(
        (status = 204, description = "Account deleted"),
        (status = 403, description = "Root permission required"),
        (status = 404, description = "User not found")
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn delete_other_user(
    State(state): State<AppState>,
    MaintainerUser(caller): MaintainerUser,
    Path(username): Path<String>,
) -> Result<StatusCode, AuthError> {
    let users = PgUserStore::new(state.db.clone());
    let target = users
        .find_by_username(&username)
        .await?
        .ok_or(AuthError::AccountNotFound)?;

    if target.is_root && !caller.is_root {
        return Err(AuthError::RootRequired);
    }

    users.delete(target.id).await?;
    tracing::info!("User id={} deleted by id={}", target.id, caller.id);
    Ok(StatusCode::NO_CONTENT)
}
