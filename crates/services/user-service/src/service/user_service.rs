//! User service - CRUD use cases over the user store.
//!
//! Passwords are never taken from the client: signup issues a random one
//! and only the auth service changes it afterwards.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use common::{AppError, AppResult, OptionExt};
use domain::{NewUser, ReplaceUser, UpdateUser, User, UserFilter};

use super::CredentialService;
use crate::repository::{RoleRepository, UserRepository};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Profile fields accepted on signup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateUser {
    pub email: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub role_id: Option<Uuid>,
}

/// User service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserService: Send + Sync {
    /// Create a user with a server-generated password
    async fn create_user(&self, input: CreateUser) -> AppResult<User>;

    async fn count_users(&self, filter: &UserFilter) -> AppResult<u64>;

    async fn find_users(&self, filter: &UserFilter, page: PaginationParams)
        -> AppResult<Vec<User>>;

    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    async fn update_user(&self, id: Uuid, changes: UpdateUser) -> AppResult<User>;

    /// Patch every user matching the filter, returning how many changed
    async fn update_users(&self, filter: &UserFilter, changes: UpdateUser) -> AppResult<u64>;

    async fn replace_user(&self, id: Uuid, replacement: ReplaceUser) -> AppResult<User>;

    async fn delete_user(&self, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of UserService using repositories.
pub struct UserManager {
    users: Arc<dyn UserRepository>,
    roles: Arc<dyn RoleRepository>,
    credentials: Arc<dyn CredentialService>,
}

impl UserManager {
    pub fn new(
        users: Arc<dyn UserRepository>,
        roles: Arc<dyn RoleRepository>,
        credentials: Arc<dyn CredentialService>,
    ) -> Self {
        Self {
            users,
            roles,
            credentials,
        }
    }

    async fn ensure_role_exists(&self, role_id: Option<Uuid>) -> AppResult<()> {
        let Some(id) = role_id else {
            return Ok(());
        };
        if self.roles.find_by_id(id).await?.is_none() {
            return Err(AppError::validation("Role does not exist"));
        }
        Ok(())
    }

    /// Reject an email already owned by a different user
    async fn ensure_email_free(&self, email: &str, owner: Option<Uuid>) -> AppResult<()> {
        match self.users.find_by_email(email).await? {
            Some(existing) if Some(existing.id) != owner => Err(AppError::conflict("Email")),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn create_user(&self, input: CreateUser) -> AppResult<User> {
        self.ensure_email_free(&input.email, None).await?;
        self.ensure_role_exists(input.role_id).await?;

        let password = self.credentials.generate_random_password();
        let password_hash = self.credentials.digest(&password)?;

        let user = self
            .users
            .create(NewUser {
                email: input.email,
                password_hash,
                name: input.name,
                phone: input.phone,
                role_id: input.role_id,
            })
            .await?;

        tracing::info!(user_id = %user.id, "User created");
        Ok(user)
    }

    async fn count_users(&self, filter: &UserFilter) -> AppResult<u64> {
        self.users.count(filter).await
    }

    async fn find_users(
        &self,
        filter: &UserFilter,
        page: PaginationParams,
    ) -> AppResult<Vec<User>> {
        self.users.find(filter, page).await
    }

    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.users.find_by_id(id).await?.ok_or_not_found()
    }

    async fn update_user(&self, id: Uuid, changes: UpdateUser) -> AppResult<User> {
        if changes.is_empty() {
            return Err(AppError::validation("No fields to update"));
        }
        self.get_user(id).await?;
        if let Some(ref email) = changes.email {
            self.ensure_email_free(email, Some(id)).await?;
        }
        self.ensure_role_exists(changes.role_id).await?;

        self.users.update(id, changes).await
    }

    async fn update_users(&self, filter: &UserFilter, changes: UpdateUser) -> AppResult<u64> {
        if changes.is_empty() {
            return Err(AppError::validation("No fields to update"));
        }
        if changes.email.is_some() {
            return Err(AppError::validation("Email cannot be updated in bulk"));
        }
        self.ensure_role_exists(changes.role_id).await?;

        let count = self.users.update_many(filter, changes).await?;
        tracing::info!(count, "Users updated in bulk");
        Ok(count)
    }

    async fn replace_user(&self, id: Uuid, replacement: ReplaceUser) -> AppResult<User> {
        self.get_user(id).await?;
        self.ensure_email_free(&replacement.email, Some(id)).await?;
        self.ensure_role_exists(replacement.role_id).await?;

        self.users.replace(id, replacement).await
    }

    async fn delete_user(&self, id: Uuid) -> AppResult<()> {
        self.users.delete(id).await?;
        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }
}
