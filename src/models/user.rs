use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Account role. An AdminOwner is bound to exactly one school and controls
/// that school's users and records; a SubAdmin shares the admin surfaces
/// but belongs to the school of the owner that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Role {
    User,
    SubAdmin,
    AdminOwner,
}

impl Role {
    pub fn is_admin(self) -> bool {
        matches!(self, Role::SubAdmin | Role::AdminOwner)
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::User => "User",
            Role::SubAdmin => "Sub-Admin",
            Role::AdminOwner => "Admin Owner",
        }
    }
}

/// A stored account. Timestamps are `"%Y-%m-%d %H:%M:%S"` text; the trial
/// window is fixed at creation and only consulted at authentication time.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub school_name: Option<String>,
    pub role: Role,
    pub created_at: String,
    pub trial_start: String,
    pub trial_end: String,
    pub created_by: String,
}
