//! Service layer - business logic over the repositories.

mod auth_service;
mod credentials;
mod role_service;
mod user_service;

pub use auth_service::{AuthService, Authenticator};
pub use credentials::{CredentialManager, CredentialService};
pub use role_service::{RoleManager, RoleService};
pub use user_service::{CreateUser, UserManager, UserService};

#[cfg(any(test, feature = "test-utils"))]
pub use auth_service::MockAuthService;
#[cfg(any(test, feature = "test-utils"))]
pub use credentials::MockCredentialService;
#[cfg(any(test, feature = "test-utils"))]
pub use role_service::MockRoleService;
#[cfg(any(test, feature = "test-utils"))]
pub use user_service::MockUserService;
