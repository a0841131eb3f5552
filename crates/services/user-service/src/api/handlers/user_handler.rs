//! User CRUD handlers, mounted under `/usuarios`.

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

use super::role_handler;
use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::service::CreateUser;
use crate::types::{CountResponse, NoContent, PaginationParams};
use common::AppResult;
use domain::{ReplaceUser, UpdateUser, UserFilter, UserResponse};

/// Signup request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    /// Login email, unique across users
    #[validate(
        email(message = "Invalid email format"),
        length(max = 255, message = "Email must be at most 255 characters")
    )]
    #[schema(example = "ana@example.com")]
    pub email: String,
    /// Ignored: the server always issues a random password
    #[serde(default)]
    #[schema(example = "hunter2")]
    pub password: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Name must be 1 to 255 characters"))]
    #[schema(example = "Ana Gómez")]
    pub name: Option<String>,
    #[validate(length(max = 32, message = "Phone must be at most 32 characters"))]
    #[schema(example = "+34 600 000 000")]
    pub phone: Option<String>,
    pub role_id: Option<Uuid>,
}

impl From<CreateUserRequest> for CreateUser {
    fn from(req: CreateUserRequest) -> Self {
        CreateUser {
            email: req.email,
            name: req.name,
            phone: req.phone,
            role_id: req.role_id,
        }
    }
}

/// Partial user update; absent fields are left untouched
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    #[validate(
        email(message = "Invalid email format"),
        length(max = 255, message = "Email must be at most 255 characters")
    )]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Name must be 1 to 255 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 32, message = "Phone must be at most 32 characters"))]
    pub phone: Option<String>,
    pub role_id: Option<Uuid>,
}

impl From<UpdateUserRequest> for UpdateUser {
    fn from(req: UpdateUserRequest) -> Self {
        UpdateUser {
            email: req.email,
            name: req.name,
            phone: req.phone,
            role_id: req.role_id,
        }
    }
}

/// Full user replacement; omitted optional fields are cleared
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ReplaceUserRequest {
    #[validate(
        email(message = "Invalid email format"),
        length(max = 255, message = "Email must be at most 255 characters")
    )]
    pub email: String,
    #[validate(length(min = 1, max = 255, message = "Name must be 1 to 255 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 32, message = "Phone must be at most 32 characters"))]
    pub phone: Option<String>,
    pub role_id: Option<Uuid>,
}

impl From<ReplaceUserRequest> for ReplaceUser {
    fn from(req: ReplaceUserRequest) -> Self {
        ReplaceUser {
            email: req.email,
            name: req.name,
            phone: req.phone,
            role_id: req.role_id,
        }
    }
}

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_users).post(create_user).patch(update_users),
        )
        .route("/count", get(count_users))
        .route(
            "/:id",
            get(get_user)
                .patch(update_user)
                .put(replace_user)
                .delete(delete_user),
        )
        .route("/:id/rol", get(role_handler::get_role_for_user))
}

/// Create a user with a server-generated password
#[utoipa::path(
    post,
    path = "/usuarios",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already exists")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user = state.user_service.create_user(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Count users matching a filter
#[utoipa::path(
    get,
    path = "/usuarios/count",
    tag = "Users",
    params(UserFilter),
    responses(
        (status = 200, description = "Number of matching users", body = CountResponse)
    )
)]
pub async fn count_users(
    State(state): State<AppState>,
    Query(filter): Query<UserFilter>,
) -> AppResult<Json<CountResponse>> {
    let count = state.user_service.count_users(&filter).await?;
    Ok(Json(count.into()))
}

/// List users matching a filter
#[utoipa::path(
    get,
    path = "/usuarios",
    tag = "Users",
    params(UserFilter, PaginationParams),
    responses(
        (status = 200, description = "Matching users", body = [UserResponse])
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(filter): Query<UserFilter>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<Vec<UserResponse>>> {
    let users = state.user_service.find_users(&filter, page).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Get user by ID
#[utoipa::path(
    get,
    path = "/usuarios/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserResponse>> {
    let user = state.user_service.get_user(id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Patch every user matching a filter
#[utoipa::path(
    patch,
    path = "/usuarios",
    tag = "Users",
    params(UserFilter),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Number of updated users", body = CountResponse),
        (status = 400, description = "Validation error")
    )
)]
pub async fn update_users(
    State(state): State<AppState>,
    Query(filter): Query<UserFilter>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> AppResult<Json<CountResponse>> {
    let count = state
        .user_service
        .update_users(&filter, payload.into())
        .await?;
    Ok(Json(count.into()))
}

/// Patch one user
#[utoipa::path(
    patch,
    path = "/usuarios/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 204, description = "User updated"),
        (status = 400, description = "Validation error"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already exists")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> AppResult<NoContent> {
    state.user_service.update_user(id, payload.into()).await?;
    Ok(NoContent)
}

/// Replace one user
#[utoipa::path(
    put,
    path = "/usuarios/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = ReplaceUserRequest,
    responses(
        (status = 204, description = "User replaced"),
        (status = 400, description = "Validation error"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already exists")
    )
)]
pub async fn replace_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<ReplaceUserRequest>,
) -> AppResult<NoContent> {
    state.user_service.replace_user(id, payload.into()).await?;
    Ok(NoContent)
}

/// Delete user (hard delete)
#[utoipa::path(
    delete,
    path = "/usuarios/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state.user_service.delete_user(id).await?;
    Ok(NoContent)
}
