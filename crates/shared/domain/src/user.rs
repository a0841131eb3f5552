//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub role_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user without profile fields or role
    pub fn new(id: Uuid, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            email,
            password_hash,
            name: None,
            phone: None,
            role_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the stored password digest
    pub fn set_password_hash(&mut self, password_hash: String) {
        self.password_hash = password_hash;
        self.updated_at = Utc::now();
    }
}

/// Data required to persist a new user (password already digested)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub role_id: Option<Uuid>,
}

/// Partial user update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub role_id: Option<Uuid>,
}

impl UpdateUser {
    /// True when no field would change
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.name.is_none() && self.phone.is_none() && self.role_id.is_none()
    }
}

/// Full user replacement. Optional fields set to `None` are cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceUser {
    pub email: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub role_id: Option<Uuid>,
}

/// Where-clause for find, count and bulk update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(
    feature = "openapi",
    derive(utoipa::IntoParams),
    into_params(parameter_in = Query)
)]
pub struct UserFilter {
    /// Exact email match
    pub email: Option<String>,
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    /// Users associated with this role
    pub role_id: Option<Uuid>,
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserResponse {
    /// Unique user identifier
    pub id: Uuid,
    /// User email address
    pub email: String,
    /// User display name
    pub name: Option<String>,
    /// Contact phone
    pub phone: Option<String>,
    /// Associated role
    pub role_id: Option<Uuid>,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            phone: user.phone,
            role_id: user.role_id,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
