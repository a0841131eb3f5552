//! Authentication handlers: identify, password recovery and change.
//!
//! Failed checks answer `200` with `null` or `false`.

use axum::{extract::State, response::Json, routing::post, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidateEmail, ValidationError, ValidationErrors};

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use common::AppResult;
use domain::{Credentials, CredentialsChangeRequest, UserResponse};

/// Credentials to check
#[derive(Deserialize, Validate, ToSchema)]
pub struct IdentifyRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "ana@example.com")]
    pub email: String,
    #[schema(example = "hunter2")]
    pub password: String,
}

impl From<IdentifyRequest> for Credentials {
    fn from(req: IdentifyRequest) -> Self {
        Credentials {
            email: req.email,
            password: req.password,
        }
    }
}

/// Email whose owner gets a new password: a bare string or `{"email": ...}`
#[derive(Debug, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum RecoverPasswordRequest {
    Email(String),
    Object { email: String },
}

impl RecoverPasswordRequest {
    pub fn email(&self) -> &str {
        match self {
            RecoverPasswordRequest::Email(email) => email,
            RecoverPasswordRequest::Object { email } => email,
        }
    }
}

impl Validate for RecoverPasswordRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        if self.email().validate_email() {
            return Ok(());
        }
        let mut error = ValidationError::new("email");
        error.message = Some("Invalid email format".into());

        let mut errors = ValidationErrors::new();
        errors.add("email", error);
        Err(errors)
    }
}

/// Password change proven by the current password
#[derive(Deserialize, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    pub id: Uuid,
    #[schema(example = "hunter2")]
    pub current_password: String,
    #[validate(length(min = 1, message = "New password cannot be empty"))]
    #[schema(example = "correct horse battery staple")]
    pub new_password: String,
}

impl From<ChangePasswordRequest> for CredentialsChangeRequest {
    fn from(req: ChangePasswordRequest) -> Self {
        CredentialsChangeRequest {
            id: req.id,
            current_password: req.current_password,
            new_password: req.new_password,
        }
    }
}

/// Create authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/identificar-usuario", post(identify))
        .route("/recuperar-clave", post(recover_password))
        .route("/cambiar-clave", post(change_password))
}

/// Identify a user by email and password
#[utoipa::path(
    post,
    path = "/identificar-usuario",
    tag = "Authentication",
    request_body = IdentifyRequest,
    responses(
        (status = 200, description = "The matching user, or null when the credentials do not match", body = UserResponse),
        (status = 400, description = "Validation error")
    )
)]
pub async fn identify(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<IdentifyRequest>,
) -> AppResult<Json<Option<UserResponse>>> {
    let user = state.auth_service.identify(payload.into()).await?;
    Ok(Json(user.map(UserResponse::from)))
}

/// Reset a user's password to a new random value
#[utoipa::path(
    post,
    path = "/recuperar-clave",
    tag = "Authentication",
    request_body = RecoverPasswordRequest,
    responses(
        (status = 200, description = "Whether a user with that email exists", body = bool),
        (status = 400, description = "Validation error")
    )
)]
pub async fn recover_password(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RecoverPasswordRequest>,
) -> AppResult<Json<bool>> {
    let recovered = state.auth_service.recover_password(payload.email()).await?;
    Ok(Json(recovered))
}

/// Change a user's password
#[utoipa::path(
    post,
    path = "/cambiar-clave",
    tag = "Authentication",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Whether the password was changed", body = bool),
        (status = 400, description = "Validation error")
    )
)]
pub async fn change_password(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ChangePasswordRequest>,
) -> AppResult<Json<bool>> {
    let changed = state.auth_service.change_password(payload.into()).await?;
    Ok(Json(changed))
}
