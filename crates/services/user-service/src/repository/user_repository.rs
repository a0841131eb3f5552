//! User repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::{Expr, Func, LikeExpr},
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use super::map_write_err;
use crate::types::PaginationParams;
use common::{AppError, AppResult, OptionExt};
use domain::{NewUser, ReplaceUser, UpdateUser, User, UserFilter};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Users matching the filter, oldest first
    async fn find(&self, filter: &UserFilter, page: PaginationParams) -> AppResult<Vec<User>>;

    async fn count(&self, filter: &UserFilter) -> AppResult<u64>;

    async fn create(&self, user: NewUser) -> AppResult<User>;

    /// Apply a partial update. `NotFound` for an unknown id.
    async fn update(&self, id: Uuid, changes: UpdateUser) -> AppResult<User>;

    /// Overwrite every mutable field. `NotFound` for an unknown id.
    async fn replace(&self, id: Uuid, replacement: ReplaceUser) -> AppResult<User>;

    /// Apply a partial update to every match, returning the affected row count
    async fn update_many(&self, filter: &UserFilter, changes: UpdateUser) -> AppResult<u64>;

    async fn set_password_hash(&self, id: Uuid, password_hash: String) -> AppResult<()>;

    /// Hard delete. `NotFound` when nothing was removed.
    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// SeaORM-backed implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, id: Uuid) -> AppResult<user::Model> {
        UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found()
    }
}

/// Lowercased `%needle%` with LIKE wildcards in the needle escaped
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Translate a filter into a where clause
fn filter_condition(filter: &UserFilter) -> Condition {
    let mut condition = Condition::all();

    if let Some(ref email) = filter.email {
        condition = condition.add(user::Column::Email.eq(email.as_str()));
    }
    if let Some(ref name) = filter.name {
        let pattern = LikeExpr::new(contains_pattern(name)).escape('\\');
        condition = condition.add(Expr::expr(Func::lower(Expr::col(user::Column::Name))).like(pattern));
    }
    if let Some(role_id) = filter.role_id {
        condition = condition.add(user::Column::RoleId.eq(role_id));
    }

    condition
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn find(&self, filter: &UserFilter, page: PaginationParams) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .filter(filter_condition(filter))
            .order_by_asc(user::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(User::from).collect())
    }

    async fn count(&self, filter: &UserFilter) -> AppResult<u64> {
        UserEntity::find()
            .filter(filter_condition(filter))
            .count(&self.db)
            .await
            .map_err(AppError::from)
    }

    async fn create(&self, user: NewUser) -> AppResult<User> {
        let now = Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(user.email),
            password_hash: Set(user.password_hash),
            name: Set(user.name),
            phone: Set(user.phone),
            role_id: Set(user.role_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| map_write_err(e, "Email"))?;
        Ok(User::from(model))
    }

    async fn update(&self, id: Uuid, changes: UpdateUser) -> AppResult<User> {
        let mut active: ActiveModel = self.find_model(id).await?.into();

        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(name) = changes.name {
            active.name = Set(Some(name));
        }
        if let Some(phone) = changes.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(role_id) = changes.role_id {
            active.role_id = Set(Some(role_id));
        }
        active.updated_at = Set(Utc::now());

        let model = active
            .update(&self.db)
            .await
            .map_err(|e| map_write_err(e, "Email"))?;
        Ok(User::from(model))
    }

    async fn replace(&self, id: Uuid, replacement: ReplaceUser) -> AppResult<User> {
        let mut active: ActiveModel = self.find_model(id).await?.into();

        active.email = Set(replacement.email);
        active.name = Set(replacement.name);
        active.phone = Set(replacement.phone);
        active.role_id = Set(replacement.role_id);
        active.updated_at = Set(Utc::now());

        let model = active
            .update(&self.db)
            .await
            .map_err(|e| map_write_err(e, "Email"))?;
        Ok(User::from(model))
    }

    async fn update_many(&self, filter: &UserFilter, changes: UpdateUser) -> AppResult<u64> {
        let mut update = UserEntity::update_many().filter(filter_condition(filter));

        if let Some(email) = changes.email {
            update = update.col_expr(user::Column::Email, Expr::value(email));
        }
        if let Some(name) = changes.name {
            update = update.col_expr(user::Column::Name, Expr::value(name));
        }
        if let Some(phone) = changes.phone {
            update = update.col_expr(user::Column::Phone, Expr::value(phone));
        }
        if let Some(role_id) = changes.role_id {
            update = update.col_expr(user::Column::RoleId, Expr::value(role_id));
        }

        let result = update
            .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now()))
            .exec(&self.db)
            .await
            .map_err(|e| map_write_err(e, "Email"))?;

        Ok(result.rows_affected)
    }

    async fn set_password_hash(&self, id: Uuid, password_hash: String) -> AppResult<()> {
        let mut active: ActiveModel = self.find_model(id).await?.into();
        active.password_hash = Set(password_hash);
        active.updated_at = Set(Utc::now());

        active.update(&self.db).await.map_err(AppError::from)?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = UserEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }
}
