//! User entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use dashshare_core::access::Principal;
use dashshare_core::notification_types::sender_display;
use dashshare_core::roles::Role;
use dashshare_core::types::{DbId, Timestamp};

use super::decode_text;

/// Raw `users` row; `role` is still TEXT.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct UserRow {
    pub id: DbId,
    pub email: String,
    pub name: Option<String>,
    pub role: String,
    pub company_id: Option<DbId>,
    pub invited_by: Option<DbId>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A user account.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    pub company_id: Option<DbId>,
    pub invited_by: Option<DbId>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<UserRow> for User {
    type Error = sqlx::Error;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            email: row.email,
            name: row.name,
            role: decode_text("role", &row.role)?,
            company_id: row.company_id,
            invited_by: row.invited_by,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl User {
    /// The fields access-control decisions need.
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.id,
            role: self.role,
            company_id: self.company_id,
        }
    }

    /// Name used when rendering notification messages.
    pub fn display_name(&self) -> &str {
        sender_display(self.name.as_deref(), &self.email)
    }
}

/// The user fields embedded in other entities' responses.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct UserSummary {
    pub id: DbId,
    pub name: Option<String>,
    pub email: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// DTO for creating a user. Account provisioning lives outside this
/// service; the store exposes it for seeding and tests.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    pub company_id: Option<DbId>,
    pub invited_by: Option<DbId>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}
