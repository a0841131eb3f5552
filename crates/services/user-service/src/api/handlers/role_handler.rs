//! Role handlers, mounted under `/roles`, plus the user's role lookup.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::types::{NoContent, PaginationParams};
use common::AppResult;
use domain::{Role, UpdateRole, UserResponse};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRoleRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    #[schema(example = "admin")]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateRoleRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: Option<String>,
}

/// Create role routes
pub fn role_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_roles).post(create_role))
        .route(
            "/:id",
            get(get_role).patch(update_role).delete(delete_role),
        )
        .route("/:id/usuarios", get(list_role_users))
}

/// Role of a user
#[utoipa::path(
    get,
    path = "/usuarios/{id}/rol",
    tag = "Roles",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "The user's role", body = Role),
        (status = 404, description = "User not found or without role")
    )
)]
pub async fn get_role_for_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Role>> {
    let role = state.role_service.get_role_for_user(id).await?;
    Ok(Json(role))
}

#[utoipa::path(
    post,
    path = "/roles",
    tag = "Roles",
    request_body = CreateRoleRequest,
    responses(
        (status = 201, description = "Role created", body = Role),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Role already exists")
    )
)]
pub async fn create_role(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateRoleRequest>,
) -> AppResult<(StatusCode, Json<Role>)> {
    let role = state.role_service.create_role(payload.name).await?;
    Ok((StatusCode::CREATED, Json(role)))
}

#[utoipa::path(
    get,
    path = "/roles",
    tag = "Roles",
    params(PaginationParams),
    responses(
        (status = 200, description = "Roles ordered by name", body = [Role])
    )
)]
pub async fn list_roles(
    State(state): State<AppState>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<Vec<Role>>> {
    let roles = state.role_service.list_roles(page).await?;
    Ok(Json(roles))
}

#[utoipa::path(
    get,
    path = "/roles/{id}",
    tag = "Roles",
    params(("id" = Uuid, Path, description = "Role ID")),
    responses(
        (status = 200, description = "Role found", body = Role),
        (status = 404, description = "Role not found")
    )
)]
pub async fn get_role(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Role>> {
    let role = state.role_service.get_role(id).await?;
    Ok(Json(role))
}

#[utoipa::path(
    patch,
    path = "/roles/{id}",
    tag = "Roles",
    params(("id" = Uuid, Path, description = "Role ID")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = Role),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Role not found"),
        (status = 409, description = "Role already exists")
    )
)]
pub async fn update_role(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateRoleRequest>,
) -> AppResult<Json<Role>> {
    let role = state
        .role_service
        .update_role(id, UpdateRole { name: payload.name })
        .await?;
    Ok(Json(role))
}

/// Delete a role; its users are detached
#[utoipa::path(
    delete,
    path = "/roles/{id}",
    tag = "Roles",
    params(("id" = Uuid, Path, description = "Role ID")),
    responses(
        (status = 204, description = "Role deleted"),
        (status = 404, description = "Role not found")
    )
)]
pub async fn delete_role(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state.role_service.delete_role(id).await?;
    Ok(NoContent)
}

#[utoipa::path(
    get,
    path = "/roles/{id}/usuarios",
    tag = "Roles",
    params(("id" = Uuid, Path, description = "Role ID")),
    responses(
        (status = 200, description = "Users holding the role", body = [UserResponse]),
        (status = 404, description = "Role not found")
    )
)]
pub async fn list_role_users(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<UserResponse>>> {
    let users = state.role_service.list_users_of_role(id).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}
