use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum UserRole {
        Employee => "employee",
        Manager => "manager",
        Owner => "owner",
    }
}

/// Read-only view of a worker as kept by the user directory.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    /// Daily capacity in hours
    pub available_hours: BigDecimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// The resolved caller of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActingUser {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl ActingUser {
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn is_manager_or_owner(&self) -> bool {
        matches!(self.role, UserRole::Manager | UserRole::Owner)
    }

    /// Owners and managers act on anyone, employees only on themselves.
    pub fn can_access_user(&self, user_id: Uuid) -> bool {
        self.is_manager_or_owner() || self.user_id == user_id
    }

    /// The user a scoped read should be pinned to.
    pub fn scope_user(&self, requested: Option<Uuid>) -> Option<Uuid> {
        if self.is_manager_or_owner() {
            requested
        } else {
            Some(self.user_id)
        }
    }
}
