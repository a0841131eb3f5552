//! Domain layer - Core business entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.
//! Users, roles and the credential types used by the authentication
//! endpoints live here, together with the password value object.

pub mod constants;
pub mod credentials;
pub mod error;
pub mod password;
pub mod role;
pub mod user;

pub use constants::*;
pub use credentials::{Credentials, CredentialsChangeRequest};
pub use error::{DomainError, DomainResult};
pub use password::{generate_random_password, legacy_digest, Password};
pub use role::{NewRole, Role, UpdateRole};
pub use user::{NewUser, ReplaceUser, UpdateUser, User, UserFilter, UserResponse};
