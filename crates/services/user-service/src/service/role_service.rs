//! Role service - role CRUD and the role/user relation lookups.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use common::{AppError, AppResult, OptionExt};
use domain::{NewRole, Role, UpdateRole, User};

use crate::repository::RoleRepository;
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RoleService: Send + Sync {
    /// Role the user belongs to. `NotFound` for unknown users and users without a role.
    async fn get_role_for_user(&self, user_id: Uuid) -> AppResult<Role>;

    async fn create_role(&self, name: String) -> AppResult<Role>;

    async fn list_roles(&self, page: PaginationParams) -> AppResult<Vec<Role>>;

    async fn get_role(&self, id: Uuid) -> AppResult<Role>;

    async fn update_role(&self, id: Uuid, changes: UpdateRole) -> AppResult<Role>;

    async fn delete_role(&self, id: Uuid) -> AppResult<()>;

    async fn list_users_of_role(&self, id: Uuid) -> AppResult<Vec<User>>;
}

pub struct RoleManager {
    roles: Arc<dyn RoleRepository>,
}

impl RoleManager {
    pub fn new(roles: Arc<dyn RoleRepository>) -> Self {
        Self { roles }
    }

    async fn ensure_name_free(&self, name: &str, owner: Option<Uuid>) -> AppResult<()> {
        match self.roles.find_by_name(name).await? {
            Some(existing) if Some(existing.id) != owner => Err(AppError::conflict("Role")),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl RoleService for RoleManager {
    async fn get_role_for_user(&self, user_id: Uuid) -> AppResult<Role> {
        self.roles
            .find_by_user(user_id)
            .await?
            .ok_or_not_found()
    }

    async fn create_role(&self, name: String) -> AppResult<Role> {
        self.ensure_name_free(&name, None).await?;

        let role = self.roles.create(NewRole { name }).await?;
        tracing::info!(role_id = %role.id, name = %role.name, "Role created");
        Ok(role)
    }

    async fn list_roles(&self, page: PaginationParams) -> AppResult<Vec<Role>> {
        self.roles.list(page).await
    }

    async fn get_role(&self, id: Uuid) -> AppResult<Role> {
        self.roles.find_by_id(id).await?.ok_or_not_found()
    }

    async fn update_role(&self, id: Uuid, changes: UpdateRole) -> AppResult<Role> {
        let Some(ref name) = changes.name else {
            return Err(AppError::validation("No fields to update"));
        };
        self.ensure_name_free(name, Some(id)).await?;

        self.roles.update(id, changes).await
    }

    async fn delete_role(&self, id: Uuid) -> AppResult<()> {
        self.roles.delete(id).await?;
        tracing::info!(role_id = %id, "Role deleted");
        Ok(())
    }

    async fn list_users_of_role(&self, id: Uuid) -> AppResult<Vec<User>> {
        self.roles.find_users(id).await?.ok_or_not_found()
    }
}
