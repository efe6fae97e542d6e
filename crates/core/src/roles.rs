//! Platform roles.
//!
//! String forms must match the `ck_users_role` CHECK constraint in the
//! initial schema migration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const ROLE_SUPER_ADMIN: &str = "SUPER_ADMIN";
pub const ROLE_ADMIN: &str = "ADMIN";
pub const ROLE_USER: &str = "USER";

/// All valid role strings.
pub const VALID_ROLES: &[&str] = &[ROLE_SUPER_ADMIN, ROLE_ADMIN, ROLE_USER];

/// A user's role. `SuperAdmin` is platform-wide and has no company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    SuperAdmin,
    Admin,
    User,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::SuperAdmin => ROLE_SUPER_ADMIN,
            Role::Admin => ROLE_ADMIN,
            Role::User => ROLE_USER,
        }
    }

    /// `true` for ADMIN and SUPER_ADMIN.
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_SUPER_ADMIN => Ok(Role::SuperAdmin),
            ROLE_ADMIN => Ok(Role::Admin),
            ROLE_USER => Ok(Role::User),
            other => Err(format!(
                "Unknown role '{other}'. Must be one of: {}",
                VALID_ROLES.join(", ")
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_roles() {
        assert_eq!("SUPER_ADMIN".parse::<Role>(), Ok(Role::SuperAdmin));
        assert_eq!("ADMIN".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("USER".parse::<Role>(), Ok(Role::User));
    }

    #[test]
    fn rejects_unknown_and_lowercase_roles() {
        assert!("admin".parse::<Role>().is_err());
        assert!("OWNER".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn round_trips_through_as_str() {
        for role in [Role::SuperAdmin, Role::Admin, Role::User] {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
    }

    #[test]
    fn serializes_as_screaming_snake_case() {
        let json = serde_json::to_string(&Role::SuperAdmin).unwrap();
        assert_eq!(json, "\"SUPER_ADMIN\"");
    }

    #[test]
    fn admin_check() {
        assert!(Role::Admin.is_admin());
        assert!(Role::SuperAdmin.is_admin());
        assert!(!Role::User.is_admin());
    }
}
