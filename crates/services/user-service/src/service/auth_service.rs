//! Authentication helpers - identify, password recovery and change.
//!
//! Failed checks are answers, not errors: identify yields `None` and the
//! two password operations yield `false`.

use async_trait::async_trait;
use std::sync::Arc;

use common::AppResult;
use domain::{Credentials, CredentialsChangeRequest, User};

use super::CredentialService;
use crate::repository::UserRepository;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// The user owning these credentials, if the password verifies
    async fn identify(&self, credentials: Credentials) -> AppResult<Option<User>>;

    /// Issue a new random password for the email's owner
    async fn recover_password(&self, email: &str) -> AppResult<bool>;

    /// Replace the password after checking the current one
    async fn change_password(&self, request: CredentialsChangeRequest) -> AppResult<bool>;
}

pub struct Authenticator {
    users: Arc<dyn UserRepository>,
    credentials: Arc<dyn CredentialService>,
}

impl Authenticator {
    pub fn new(users: Arc<dyn UserRepository>, credentials: Arc<dyn CredentialService>) -> Self {
        Self { users, credentials }
    }
}

#[async_trait]
impl AuthService for Authenticator {
    async fn identify(&self, credentials: Credentials) -> AppResult<Option<User>> {
        let Some(mut user) = self.users.find_by_email(&credentials.email).await? else {
            // Same verification cost as a wrong password
            self.credentials.verify_dummy(&credentials.password);
            tracing::debug!("Identify failed: unknown email");
            return Ok(None);
        };

        if !self
            .credentials
            .verify(&credentials.password, &user.password_hash)
        {
            tracing::debug!(user_id = %user.id, "Identify failed: password mismatch");
            return Ok(None);
        }

        if self.credentials.needs_rehash(&user.password_hash) {
            let digest = self.credentials.digest(&credentials.password)?;
            self.users.set_password_hash(user.id, digest.clone()).await?;
            user.set_password_hash(digest);
            tracing::info!(user_id = %user.id, "Legacy password digest upgraded");
        }

        Ok(Some(user))
    }

    async fn recover_password(&self, email: &str) -> AppResult<bool> {
        let Some(user) = self.users.find_by_email(email).await? else {
            return Ok(false);
        };

        let password = self.credentials.generate_random_password();
        let digest = self.credentials.digest(&password)?;
        self.users.set_password_hash(user.id, digest).await?;

        tracing::info!(user_id = %user.id, "Password reset to a generated value");
        Ok(true)
    }

    async fn change_password(&self, request: CredentialsChangeRequest) -> AppResult<bool> {
        let Some(user) = self.users.find_by_id(request.id).await? else {
            return Ok(false);
        };

        if !self
            .credentials
            .verify(&request.current_password, &user.password_hash)
        {
            tracing::debug!(user_id = %user.id, "Password change refused");
            return Ok(false);
        }

        let digest = self.credentials.digest(&request.new_password)?;
        self.users.set_password_hash(user.id, digest).await?;

        tracing::info!(user_id = %user.id, "Password changed");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockUserRepository;
    use crate::service::{CredentialManager, MockCredentialService};
    use domain::{legacy_digest, Password};
    use mockall::predicate::eq;
    use uuid::Uuid;

    fn user_with_hash(hash: String) -> User {
        User::new(Uuid::new_v4(), "ana@example.com".to_string(), hash)
    }

    fn credentials(password: &str) -> Credentials {
        Credentials {
            email: "ana@example.com".to_string(),
            password: password.to_string(),
        }
    }

    fn real_credentials() -> Arc<dyn CredentialService> {
        Arc::new(CredentialManager::new().unwrap())
    }

    #[tokio::test]
    async fn test_identify_success() {
        let user = user_with_hash(Password::new("hunter2").unwrap().into_string());
        let user_id = user.id;

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .with(eq("ana@example.com"))
            .returning(move |_| Ok(Some(user.clone())));
        users.expect_set_password_hash().never();

        let auth = Authenticator::new(Arc::new(users), real_credentials());
        let found = auth.identify(credentials("hunter2")).await.unwrap();

        assert_eq!(found.map(|u| u.id), Some(user_id));
    }

    #[tokio::test]
    async fn test_identify_wrong_password() {
        let user = user_with_hash(Password::new("hunter2").unwrap().into_string());

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(move |_| Ok(Some(user.clone())));

        let auth = Authenticator::new(Arc::new(users), real_credentials());
        assert!(auth.identify(credentials("hunter3")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_identify_unknown_email_burns_verification() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(None));

        let mut creds = MockCredentialService::new();
        creds
            .expect_verify_dummy()
            .with(eq("hunter2"))
            .times(1)
            .return_const(());
        creds.expect_verify().never();

        let auth = Authenticator::new(Arc::new(users), Arc::new(creds));
        assert!(auth.identify(credentials("hunter2")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_identify_upgrades_legacy_digest() {
        let user = user_with_hash(legacy_digest("hunter2"));
        let user_id = user.id;

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(move |_| Ok(Some(user.clone())));
        users
            .expect_set_password_hash()
            .withf(move |id, hash| *id == user_id && hash.starts_with("$argon2"))
            .times(1)
            .returning(|_, _| Ok(()));

        let auth = Authenticator::new(Arc::new(users), real_credentials());
        let found = auth.identify(credentials("hunter2")).await.unwrap().unwrap();

        assert!(found.password_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn test_recover_password_unknown_email() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(None));
        users.expect_set_password_hash().never();

        let auth = Authenticator::new(Arc::new(users), real_credentials());
        assert!(!auth.recover_password("nobody@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_recover_password_writes_one_digest() {
        let user = user_with_hash(Password::new("hunter2").unwrap().into_string());
        let user_id = user.id;

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(move |_| Ok(Some(user.clone())));
        users
            .expect_set_password_hash()
            .with(eq(user_id), eq("digest-of-Zx81Qw0p".to_string()))
            .times(1)
            .returning(|_, _| Ok(()));

        let mut creds = MockCredentialService::new();
        creds
            .expect_generate_random_password()
            .return_const("Zx81Qw0p".to_string());
        creds
            .expect_digest()
            .returning(|p| Ok(format!("digest-of-{}", p)));

        let auth = Authenticator::new(Arc::new(users), Arc::new(creds));
        assert!(auth.recover_password("ana@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_change_password_unknown_id() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|_| Ok(None));
        users.expect_set_password_hash().never();

        let auth = Authenticator::new(Arc::new(users), real_credentials());
        let changed = auth
            .change_password(CredentialsChangeRequest {
                id: Uuid::new_v4(),
                current_password: "hunter2".to_string(),
                new_password: "correct horse".to_string(),
            })
            .await
            .unwrap();

        assert!(!changed);
    }

    #[tokio::test]
    async fn test_change_password_wrong_current() {
        let user = user_with_hash(Password::new("hunter2").unwrap().into_string());
        let user_id = user.id;

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(user.clone())));
        users.expect_set_password_hash().never();

        let auth = Authenticator::new(Arc::new(users), real_credentials());
        let changed = auth
            .change_password(CredentialsChangeRequest {
                id: user_id,
                current_password: "wrong".to_string(),
                new_password: "correct horse".to_string(),
            })
            .await
            .unwrap();

        assert!(!changed);
    }

    #[tokio::test]
    async fn test_change_password_stores_verifiable_digest() {
        let user = user_with_hash(Password::new("hunter2").unwrap().into_string());
        let user_id = user.id;

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .with(eq(user_id))
            .returning(move |_| Ok(Some(user.clone())));
        users
            .expect_set_password_hash()
            .withf(move |id, hash| {
                *id == user_id && Password::from_hash(hash.as_str()).verify("correct horse")
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let auth = Authenticator::new(Arc::new(users), real_credentials());
        let changed = auth
            .change_password(CredentialsChangeRequest {
                id: user_id,
                current_password: "hunter2".to_string(),
                new_password: "correct horse".to_string(),
            })
            .await
            .unwrap();

        assert!(changed);
    }
}
