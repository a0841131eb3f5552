//! Role repository and the role/user relation accessors.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use super::entities::role::{self, ActiveModel, Entity as RoleEntity};
use super::entities::user::{self, Entity as UserEntity};
use super::map_write_err;
use crate::types::PaginationParams;
use common::{AppError, AppResult, OptionExt};
use domain::{NewRole, Role, UpdateRole, User};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Role>>;

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>>;

    /// Role the given user belongs to. `None` when the user is unknown or has no role.
    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<Role>>;

    /// Users of a role. `None` when the role does not exist.
    async fn find_users(&self, role_id: Uuid) -> AppResult<Option<Vec<User>>>;

    async fn list(&self, page: PaginationParams) -> AppResult<Vec<Role>>;

    async fn create(&self, role: NewRole) -> AppResult<Role>;

    async fn update(&self, id: Uuid, changes: UpdateRole) -> AppResult<Role>;

    /// Hard delete; the users' `role_id` is cleared by the foreign key.
    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// SeaORM-backed implementation of RoleRepository
pub struct RoleStore {
    db: DatabaseConnection,
}

impl RoleStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RoleRepository for RoleStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Role>> {
        let result = RoleEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Role::from))
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        let result = RoleEntity::find()
            .filter(role::Column::Name.eq(name))
            .one(&self.db)
            .await?;
        Ok(result.map(Role::from))
    }

    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<Role>> {
        let result = RoleEntity::find()
            .inner_join(UserEntity)
            .filter(user::Column::Id.eq(user_id))
            .one(&self.db)
            .await?;
        Ok(result.map(Role::from))
    }

    async fn find_users(&self, role_id: Uuid) -> AppResult<Option<Vec<User>>> {
        let Some(role) = RoleEntity::find_by_id(role_id).one(&self.db).await? else {
            return Ok(None);
        };

        let users = role
            .find_related(UserEntity)
            .order_by_asc(user::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(Some(users.into_iter().map(User::from).collect()))
    }

    async fn list(&self, page: PaginationParams) -> AppResult<Vec<Role>> {
        let models = RoleEntity::find()
            .order_by_asc(role::Column::Name)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Role::from).collect())
    }

    async fn create(&self, role: NewRole) -> AppResult<Role> {
        let now = Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(role.name),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| map_write_err(e, "Role"))?;
        Ok(Role::from(model))
    }

    async fn update(&self, id: Uuid, changes: UpdateRole) -> AppResult<Role> {
        let role = RoleEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found()?;

        let mut active: ActiveModel = role.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        active.updated_at = Set(Utc::now());

        let model = active
            .update(&self.db)
            .await
            .map_err(|e| map_write_err(e, "Role"))?;
        Ok(Role::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = RoleEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn role_model(name: &str) -> role::Model {
        let now = Utc::now();
        role::Model {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn user_model(role_id: Uuid) -> user::Model {
        let now = Utc::now();
        user::Model {
            id: Uuid::new_v4(),
            email: "ana@example.com".to_string(),
            password_hash: "$argon2id$stored".to_string(),
            name: None,
            phone: None,
            role_id: Some(role_id),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_find_by_user_returns_joined_role() {
        let model = role_model("admin");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model.clone()]])
            .into_connection();
        let store = RoleStore::new(db);

        let role = store.find_by_user(Uuid::new_v4()).await.unwrap().unwrap();
        assert_eq!(role.id, model.id);
        assert_eq!(role.name, "admin");
    }

    #[tokio::test]
    async fn test_find_users_of_role() {
        let role = role_model("editor");
        let member = user_model(role.id);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![role.clone()]])
            .append_query_results([vec![member.clone()]])
            .into_connection();
        let store = RoleStore::new(db);

        let users = store.find_users(role.id).await.unwrap().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].role_id, Some(role.id));
    }

    #[tokio::test]
    async fn test_find_users_of_missing_role() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<role::Model>::new()])
            .into_connection();
        let store = RoleStore::new(db);

        assert!(store.find_users(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_role() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<role::Model>::new()])
            .into_connection();
        let store = RoleStore::new(db);

        let result = store.update(Uuid::new_v4(), UpdateRole::default()).await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }
}
