// HTTP handlers for authentication endpoints

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Form, Json,
};
use validator::Validate;

use crate::auth::{
    error::AuthError,
    models::{
        LoginForm, RefreshRequest, RegisterRequest, TokenPair, UserResponse, WorkerCredentials,
        WorkerRegisterRequest,
    },
    repository::PgUserStore,
    service::AuthService,
};
use crate::healthstack::{error::StackError, repository::HealthStackRepository};
use crate::AppState;

fn auth_service(state: &AppState) -> AuthService<PgUserStore> {
    AuthService::new(
        PgUserStore::new(state.db.clone()),
        state.codec.clone(),
        state.settings.allow_user_register,
    )
}

/// OAuth2-compatible login: exchange username and password for a token pair
/// POST /v1/auth/access-token
#[utoipa::path(
    post,
    path = "/v1/auth/access-token",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Token pair issued", body = TokenPair),
        (status = 400, description = "Incorrect username or password")
    ),
    tag = "auth"
)]
pub async fn login_access_token(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenPair>, AuthError> {
    let pair = auth_service(&state).login(&form.username, &form.password).await?;
    Ok(Json(pair))
}

/// Exchange a refresh token for a new token pair
/// POST /v1/auth/refresh-token
#[utoipa::path(
    post,
    path = "/v1/auth/refresh-token",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Token pair reissued", body = TokenPair),
        (status = 403, description = "Could not validate credentials"),
        (status = 404, description = "User not found")
    ),
    tag = "auth"
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<TokenPair>, AuthError> {
    let pair = auth_service(&state).refresh(&payload.refresh_token).await?;
    Ok(Json(pair))
}

/// Create a new user account, when registration is enabled
/// POST /v1/auth/register
#[utoipa::path(
    post,
    path = "/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = UserResponse),
        (status = 400, description = "Registration disabled or username taken"),
        (status = 404, description = "Password rejected by the strength policy")
    ),
    tag = "auth"
)]
pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<UserResponse>, AuthError> {
    payload.validate()?;

    let user = auth_service(&state)
        .register(&payload.username, &payload.password)
        .await?;
    Ok(Json(user.into()))
}

/// Create a worker account bound to a healthstack.
///
/// Requires the deployment's worker register key. The generated credentials
/// are returned once and never retrievable again.
/// POST /v1/auth/register-worker
#[utoipa::path(
    post,
    path = "/v1/auth/register-worker",
    request_body = WorkerRegisterRequest,
    responses(
        (status = 200, description = "Worker created", body = WorkerCredentials),
        (status = 404, description = "Bad key, stack missing, or stack already has a worker")
    ),
    tag = "auth"
)]
pub async fn register_worker(
    State(state): State<AppState>,
    Json(payload): Json<WorkerRegisterRequest>,
) -> Result<Json<WorkerCredentials>, Response> {
    if payload.register_key != state.settings.worker_register_key {
        return Err(AuthError::InvalidRegisterKey.into_response());
    }

    let stacks = HealthStackRepository::new(state.db.clone());
    let stack = stacks
        .find_by_id(payload.healthstack_id)
        .await
        .map_err(IntoResponse::into_response)?
        .ok_or_else(|| StackError::NotFound.into_response())?;

    if stack.worker_id.is_some() {
        return Err(StackError::AlreadyHasWorker.into_response());
    }

    let service = auth_service(&state);
    let (worker, password) = service
        .create_worker_account()
        .await
        .map_err(IntoResponse::into_response)?;

    // A concurrent registration may have claimed the stack between the check
    // above and this update; the NULL-guarded update decides the winner and
    // the loser's account is rolled back.
    let assigned = stacks
        .assign_worker(stack.id, worker.id)
        .await
        .map_err(IntoResponse::into_response)?;
    if !assigned {
        let users = PgUserStore::new(state.db.clone());
        if let Err(e) = users.delete(worker.id).await {
            tracing::error!("Failed to roll back orphaned worker account: {}", e);
        }
        return Err(StackError::AlreadyHasWorker.into_response());
    }

    tracing::info!("Worker id={} assigned to healthstack id={}", worker.id, stack.id);
    Ok(Json(WorkerCredentials {
        user: worker.into(),
        password,
    }))
}
