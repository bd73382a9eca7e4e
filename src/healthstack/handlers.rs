// HTTP handlers for the healthstack endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use validator::Validate;

use crate::auth::{CurrentUser, MaintainerUser, WorkerUser};
use crate::healthstack::{
    error::StackError,
    models::{CreateHealthStack, HealthStack, Pagination},
    repository::HealthStackRepository,
};
use crate::AppState;

/// Create a new healthstack owned by the caller
/// POST /v1/healthstack/create
#[utoipa::path(
    post,
    path = "/v1/healthstack/create",
    request_body = CreateHealthStack,
    responses(
        (status = 200, description = "HealthStack created", body = HealthStack),
        (status = 400, description = "Invalid input data"),
        (status = 403, description = "Could not validate credentials")
    ),
    security(("bearer" = [])),
    tag = "healthstack"
)]
pub async fn create_healthstack(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateHealthStack>,
) -> Result<Json<HealthStack>, StackError> {
    payload.validate()?;

    let repo = HealthStackRepository::new(state.db.clone());
    let stack = repo.create(user.id, &payload).await?;
    tracing::info!("Created healthstack id={} owner={}", stack.id, user.id);
    Ok(Json(stack))
}

/// All healthstacks, maintainer overview
/// GET /v1/healthstack
#[utoipa::path(
    get,
    path = "/v1/healthstack",
    params(Pagination),
    responses(
        (status = 200, description = "All healthstacks", body = Vec<HealthStack>),
        (status = 403, description = "Maintainer or root required")
    ),
    security(("bearer" = [])),
    tag = "healthstack"
)]
pub async fn get_all_healthstacks(
    State(state): State<AppState>,
    MaintainerUser(_user): MaintainerUser,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<HealthStack>>, StackError> {
    let repo = HealthStackRepository::new(state.db.clone());
    let stacks = repo.list(page.offset, page.limit).await?;
    Ok(Json(stacks))
}

/// Healthstacks owned by the caller
/// GET /v1/healthstack/me
#[utoipa::path(
    get,
    path = "/v1/healthstack/me",
    params(Pagination),
    responses(
        (status = 200, description = "Own healthstacks", body = Vec<HealthStack>),
        (status = 403, description = "Could not validate credentials")
    ),
    security(("bearer" = [])),
    tag = "healthstack"
)]
pub async fn get_my_healthstacks(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<HealthStack>>, StackError> {
    let repo = HealthStackRepository::new(state.db.clone());
    let stacks = repo.list_for_owner(user.id, page.offset, page.limit).await?;
    Ok(Json(stacks))
}

/// One of the caller's own healthstacks
/// GET /v1/healthstack/me/:id
#[utoipa::path(
    get,
    path = "/v1/healthstack/me/{id}",
    params(("id" = i32, Path, description = "HealthStack ID")),
    responses(
        (status = 200, description = "HealthStack found", body = HealthStack),
        (status = 404, description = "HealthStack not found")
    ),
    security(("bearer" = [])),
    tag = "healthstack"
)]
pub async fn get_my_healthstack_by_id(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<HealthStack>, StackError> {
    let repo = HealthStackRepository::new(state.db.clone());
    let stack = repo
        .find_owned_by_id(id, user.id)
        .await?
        .ok_or(StackError::NotFound)?;
    Ok(Json(stack))
}

/// Any healthstack by id, maintainer view
/// GET /v1/healthstack/:id
#[utoipa::path(
    get,
    path = "/v1/healthstack/{id}",
    params(("id" = i32, Path, description = "HealthStack ID")),
    responses(
        (status = 200, description = "HealthStack found", body = HealthStack),
        (status = 403, description = "Maintainer or root required"),
        (status = 404, description = "HealthStack not found")
    ),
    security(("bearer" = [])),
    tag = "healthstack"
)]
pub async fn get_healthstack_by_id(
    State(state): State<AppState>,
    MaintainerUser(_user): MaintainerUser,
    Path(id): Path<i32>,
) -> Result<Json<HealthStack>, StackError> {
    let repo = HealthStackRepository::new(state.db.clone());
    let stack = repo.find_by_id(id).await?.ok_or(StackError::NotFound)?;
    Ok(Json(stack))
}

/// The healthstack assigned to the calling worker
/// GET /v1/healthstack/worker/me/:id
#[utoipa::path(
    get,
    path = "/v1/healthstack/worker/me/{id}",
    params(("id" = i32, Path, description = "HealthStack ID")),
    responses(
        (status = 200, description = "HealthStack found", body = HealthStack),
        (status = 403, description = "Worker account required"),
        (status = 404, description = "HealthStack not found")
    ),
    security(("bearer" = [])),
    tag = "healthstack"
)]
pub async fn get_worker_healthstack_by_id(
    State(state): State<AppState>,
    WorkerUser(user): WorkerUser,
    Path(id): Path<i32>,
) -> Result<Json<HealthStack>, StackError> {
    let repo = HealthStackRepository::new(state.db.clone());
    let stack = repo
        .find_assigned_by_id(id, user.id)
        .await?
        .ok_or(StackError::NotFound)?;
    Ok(Json(stack))
}
