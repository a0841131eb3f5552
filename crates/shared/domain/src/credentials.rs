//! Transient credential payloads used by the authentication endpoints.
//!
//! Neither type is ever persisted. Plaintext fields are redacted from
//! `Debug` output so they cannot leak into logs.

use serde::Deserialize;
use uuid::Uuid;

/// Email and plaintext password submitted to identify a user.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Request to replace a user's password, proven by the current one.
#[derive(Clone, Deserialize)]
pub struct CredentialsChangeRequest {
    pub id: Uuid,
    pub current_password: String,
    pub new_password: String,
}

impl std::fmt::Debug for CredentialsChangeRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsChangeRequest")
            .field("id", &self.id)
            .field("current_password", &"[REDACTED]")
            .field("new_password", &"[REDACTED]")
            .finish()
    }
}
