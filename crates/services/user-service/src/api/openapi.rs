//! OpenAPI documentation served through Swagger UI.

use utoipa::OpenApi;

use crate::api::handlers::{auth_handler, role_handler, user_handler};
use crate::types::CountResponse;
use domain::{Role, UserResponse};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "User Service",
        version = "0.1.0",
        description = "User and role management with credential helpers"
    ),
    paths(
        user_handler::create_user,
        user_handler::count_users,
        user_handler::list_users,
        user_handler::get_user,
        user_handler::update_users,
        user_handler::update_user,
        user_handler::replace_user,
        user_handler::delete_user,
        auth_handler::identify,
        auth_handler::recover_password,
        auth_handler::change_password,
        role_handler::get_role_for_user,
        role_handler::create_role,
        role_handler::list_roles,
        role_handler::get_role,
        role_handler::update_role,
        role_handler::delete_role,
        role_handler::list_role_users,
    ),
    components(
        schemas(
            UserResponse,
            Role,
            CountResponse,
            user_handler::CreateUserRequest,
            user_handler::UpdateUserRequest,
            user_handler::ReplaceUserRequest,
            auth_handler::IdentifyRequest,
            auth_handler::RecoverPasswordRequest,
            auth_handler::ChangePasswordRequest,
            role_handler::CreateRoleRequest,
            role_handler::UpdateRoleRequest,
        )
    ),
    tags(
        (name = "Users", description = "User management operations"),
        (name = "Authentication", description = "Identify, recover and change passwords"),
        (name = "Roles", description = "Roles and their users")
    )
)]
pub struct ApiDoc;
