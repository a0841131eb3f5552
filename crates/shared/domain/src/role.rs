//! Role domain entity.
//!
//! A role owns a collection of users through the `role_id` reference held
//! on each user; no role-specific rules exist beyond a unique name.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role domain entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Role {
    /// Unique role identifier
    pub id: Uuid,
    /// Role name
    pub name: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl Role {
    /// Create a new role
    pub fn new(id: Uuid, name: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rename the role
    pub fn rename(&mut self, name: String) {
        self.name = name;
        self.updated_at = Utc::now();
    }
}

/// Data required to persist a new role
#[derive(Debug, Clone)]
pub struct NewRole {
    pub name: String,
}

/// Partial role update
#[derive(Debug, Clone, Default)]
pub struct UpdateRole {
    pub name: Option<String>,
}
