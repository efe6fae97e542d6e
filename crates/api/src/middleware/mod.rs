//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- The active user behind a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires the `ADMIN` or `SUPER_ADMIN` role.

pub mod auth;
pub mod rbac;
