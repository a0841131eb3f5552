//! Application state - services shared by every handler.

use std::sync::Arc;

use common::AppResult;

use crate::infra::Database;
use crate::repository::{RoleRepository, RoleStore, UserRepository, UserStore};
use crate::service::{
    AuthService, Authenticator, CredentialManager, CredentialService, RoleManager, RoleService,
    UserManager, UserService,
};

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserService>,
    pub auth_service: Arc<dyn AuthService>,
    pub role_service: Arc<dyn RoleService>,
    /// Used by the health check
    pub database: Arc<Database>,
}

impl AppState {
    /// Wire the SeaORM stores and services over one connection pool.
    pub fn from_database(database: Arc<Database>) -> AppResult<Self> {
        let users: Arc<dyn UserRepository> = Arc::new(UserStore::new(database.get_connection()));
        let roles: Arc<dyn RoleRepository> = Arc::new(RoleStore::new(database.get_connection()));
        let credentials: Arc<dyn CredentialService> = Arc::new(CredentialManager::new()?);

        Ok(Self::with_repositories(users, roles, credentials, database))
    }

    /// Wire the services over arbitrary repository implementations.
    pub fn with_repositories(
        users: Arc<dyn UserRepository>,
        roles: Arc<dyn RoleRepository>,
        credentials: Arc<dyn CredentialService>,
        database: Arc<Database>,
    ) -> Self {
        Self {
            user_service: Arc::new(UserManager::new(
                users.clone(),
                roles.clone(),
                credentials.clone(),
            )),
            auth_service: Arc::new(Authenticator::new(users, credentials)),
            role_service: Arc::new(RoleManager::new(roles)),
            database,
        }
    }

    /// Create application state with manually injected services.
    pub fn new(
        user_service: Arc<dyn UserService>,
        auth_service: Arc<dyn AuthService>,
        role_service: Arc<dyn RoleService>,
        database: Arc<Database>,
    ) -> Self {
        Self {
            user_service,
            auth_service,
            role_service,
            database,
        }
    }
}
