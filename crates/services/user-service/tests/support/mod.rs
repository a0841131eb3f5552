//! In-memory repositories shared by the integration tests.
//!
//! They follow the SeaORM stores' observable behaviour: unique emails and
//! role names, `NotFound` on unknown ids, and `role_id` cleared when a role
//! is deleted.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::{NewRole, NewUser, ReplaceUser, Role, UpdateRole, UpdateUser, User, UserFilter};
use user_service_lib::api::{create_router, AppState};
use user_service_lib::infra::Database;
use user_service_lib::repository::{RoleRepository, UserRepository};
use user_service_lib::service::CredentialManager;
use user_service_lib::types::PaginationParams;

type Table<T> = Arc<Mutex<HashMap<Uuid, T>>>;

/// Same semantics as the SQL filter: exact email, case-insensitive literal
/// substring of the name, exact role.
fn matches(filter: &UserFilter, user: &User) -> bool {
    if let Some(ref email) = filter.email {
        if &user.email != email {
            return false;
        }
    }
    if let Some(ref name) = filter.name {
        let needle = name.to_lowercase();
        let found = user
            .name
            .as_deref()
            .is_some_and(|n| n.to_lowercase().contains(&needle));
        if !found {
            return false;
        }
    }
    if let Some(role_id) = filter.role_id {
        if user.role_id != Some(role_id) {
            return false;
        }
    }
    true
}

fn apply(user: &mut User, changes: &UpdateUser) {
    if let Some(ref email) = changes.email {
        user.email = email.clone();
    }
    if let Some(ref name) = changes.name {
        user.name = Some(name.clone());
    }
    if let Some(ref phone) = changes.phone {
        user.phone = Some(phone.clone());
    }
    if let Some(role_id) = changes.role_id {
        user.role_id = Some(role_id);
    }
    user.updated_at = Utc::now();
}

fn replace(user: &mut User, replacement: &ReplaceUser) {
    user.email = replacement.email.clone();
    user.name = replacement.name.clone();
    user.phone = replacement.phone.clone();
    user.role_id = replacement.role_id;
    user.updated_at = Utc::now();
}

#[derive(Clone, Default)]
pub struct InMemoryUsers {
    rows: Table<User>,
}

impl InMemoryUsers {
    pub fn get(&self, id: Uuid) -> Option<User> {
        self.rows.lock().unwrap().get(&id).cloned()
    }

    pub fn insert(&self, user: User) {
        self.rows.lock().unwrap().insert(user.id, user);
    }

    fn email_taken(rows: &HashMap<Uuid, User>, email: &str, owner: Uuid) -> bool {
        rows.values().any(|u| u.email == email && u.id != owner)
    }

    fn sorted(rows: &HashMap<Uuid, User>, filter: &UserFilter) -> Vec<User> {
        let mut users: Vec<User> = rows.values().filter(|u| matches(filter, u)).cloned().collect();
        users.sort_by_key(|u| u.created_at);
        users
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.get(id))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.values().find(|u| u.email == email).cloned())
    }

    async fn find(&self, filter: &UserFilter, page: PaginationParams) -> AppResult<Vec<User>> {
        let rows = self.rows.lock().unwrap();
        Ok(Self::sorted(&rows, filter)
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect())
    }

    async fn count(&self, filter: &UserFilter) -> AppResult<u64> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.values().filter(|u| matches(filter, u)).count() as u64)
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let mut rows = self.rows.lock().unwrap();
        if Self::email_taken(&rows, &new_user.email, Uuid::nil()) {
            return Err(AppError::conflict("Email"));
        }

        let mut user = User::new(Uuid::new_v4(), new_user.email, new_user.password_hash);
        user.name = new_user.name;
        user.phone = new_user.phone;
        user.role_id = new_user.role_id;
        rows.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, id: Uuid, changes: UpdateUser) -> AppResult<User> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(ref email) = changes.email {
            if Self::email_taken(&rows, email, id) {
                return Err(AppError::conflict("Email"));
            }
        }
        let user = rows.get_mut(&id).ok_or(AppError::NotFound)?;
        apply(user, &changes);
        Ok(user.clone())
    }

    async fn replace(&self, id: Uuid, replacement: ReplaceUser) -> AppResult<User> {
        let mut rows = self.rows.lock().unwrap();
        if Self::email_taken(&rows, &replacement.email, id) {
            return Err(AppError::conflict("Email"));
        }
        let user = rows.get_mut(&id).ok_or(AppError::NotFound)?;
        replace(user, &replacement);
        Ok(user.clone())
    }

    async fn update_many(&self, filter: &UserFilter, changes: UpdateUser) -> AppResult<u64> {
        let mut rows = self.rows.lock().unwrap();
        let mut count = 0;
        for user in rows.values_mut().filter(|u| matches(filter, u)) {
            apply(user, &changes);
            count += 1;
        }
        Ok(count)
    }

    async fn set_password_hash(&self, id: Uuid, password_hash: String) -> AppResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let user = rows.get_mut(&id).ok_or(AppError::NotFound)?;
        user.set_password_hash(password_hash);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.rows
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(AppError::NotFound)
    }
}

#[derive(Clone)]
pub struct InMemoryRoles {
    rows: Table<Role>,
    users: InMemoryUsers,
}

impl InMemoryRoles {
    pub fn new(users: InMemoryUsers) -> Self {
        Self {
            rows: Arc::default(),
            users,
        }
    }
}

#[async_trait]
impl RoleRepository for InMemoryRoles {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Role>> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.values().find(|r| r.name == name).cloned())
    }

    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<Role>> {
        let Some(role_id) = self.users.get(user_id).and_then(|u| u.role_id) else {
            return Ok(None);
        };
        self.find_by_id(role_id).await
    }

    async fn find_users(&self, role_id: Uuid) -> AppResult<Option<Vec<User>>> {
        if self.find_by_id(role_id).await?.is_none() {
            return Ok(None);
        }
        let rows = self.users.rows.lock().unwrap();
        let filter = UserFilter {
            role_id: Some(role_id),
            ..UserFilter::default()
        };
        Ok(Some(InMemoryUsers::sorted(&rows, &filter)))
    }

    async fn list(&self, page: PaginationParams) -> AppResult<Vec<Role>> {
        let mut roles: Vec<Role> = self.rows.lock().unwrap().values().cloned().collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect())
    }

    async fn create(&self, new_role: NewRole) -> AppResult<Role> {
        let role = Role::new(Uuid::new_v4(), new_role.name);
        self.rows.lock().unwrap().insert(role.id, role.clone());
        Ok(role)
    }

    async fn update(&self, id: Uuid, changes: UpdateRole) -> AppResult<Role> {
        let mut rows = self.rows.lock().unwrap();
        let role = rows.get_mut(&id).ok_or(AppError::NotFound)?;
        if let Some(name) = changes.name {
            role.rename(name);
        }
        Ok(role.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.rows
            .lock()
            .unwrap()
            .remove(&id)
            .ok_or(AppError::NotFound)?;

        // ON DELETE SET NULL
        let mut users = self.users.rows.lock().unwrap();
        for user in users.values_mut().filter(|u| u.role_id == Some(id)) {
            user.role_id = None;
        }
        Ok(())
    }
}

/// Database whose single `SELECT 1` succeeds, for the health check.
pub fn mock_database() -> Arc<Database> {
    let connection = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();
    Arc::new(Database::from_connection(connection))
}

pub struct TestApp {
    pub state: AppState,
    pub users: InMemoryUsers,
    pub roles: InMemoryRoles,
}

impl TestApp {
    pub fn new() -> Self {
        let users = InMemoryUsers::default();
        let roles = InMemoryRoles::new(users.clone());
        let state = AppState::with_repositories(
            Arc::new(users.clone()),
            Arc::new(roles.clone()),
            Arc::new(CredentialManager::new().unwrap()),
            mock_database(),
        );

        Self { state, users, roles }
    }

    pub fn router(&self) -> axum::Router {
        create_router(self.state.clone())
    }
}

/// A user whose stored digest is already known to the test
pub fn user_with_password(email: &str, plaintext: &str) -> User {
    let digest = domain::Password::new(plaintext).unwrap().into_string();
    User::new(Uuid::new_v4(), email.to_string(), digest)
}
