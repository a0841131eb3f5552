//! Repository layer for data access.

pub mod entities;
mod role_repository;
mod user_repository;

pub use role_repository::{RoleRepository, RoleStore};
pub use user_repository::{UserRepository, UserStore};

#[cfg(any(test, feature = "test-utils"))]
pub use role_repository::MockRoleRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;

use common::AppError;
use sea_orm::{DbErr, SqlErr};

/// Map a write failure, turning unique-key violations into `Conflict`.
pub(crate) fn map_write_err(err: DbErr, entity: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::conflict(entity),
        _ => AppError::from(err),
    }
}
