//! Dashboard access-control decisions.
//!
//! Every function here is pure: callers load the dashboard and the acting
//! user, then ask whether the action is allowed. Nothing in this module
//! touches storage.

use std::collections::BTreeSet;

use crate::roles::Role;
use crate::types::DbId;

/// The acting user, reduced to the fields access decisions look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub id: DbId,
    pub role: Role,
    pub company_id: Option<DbId>,
}

/// The ownership and sharing state of a dashboard.
#[derive(Debug, Clone, Copy)]
pub struct DashboardGrant<'a> {
    pub created_by: DbId,
    pub company_id: Option<DbId>,
    pub access_users: &'a BTreeSet<DbId>,
}

/// Whether `user` may view `dashboard` (and its comments and favorites).
///
/// - SUPER_ADMIN: always.
/// - ADMIN: only dashboards they created.
/// - USER: only dashboards whose access list contains them.
///
/// A missing dashboard or a missing user is never accessible.
pub fn can_access_dashboard(dashboard: Option<DashboardGrant<'_>>, user: Option<Principal>) -> bool {
    let (Some(dashboard), Some(user)) = (dashboard, user) else {
        return false;
    };

    match user.role {
        Role::SuperAdmin => true,
        Role::Admin => dashboard.created_by == user.id,
        Role::User => dashboard.access_users.contains(&user.id),
    }
}

/// Update, delete and unassign are limited to the creator or a SUPER_ADMIN.
pub fn can_modify_dashboard(dashboard: DashboardGrant<'_>, user: Principal) -> bool {
    user.role == Role::SuperAdmin || dashboard.created_by == user.id
}

/// Explicit assignment is open to any ADMIN or to the creator.
pub fn can_assign_dashboard(dashboard: DashboardGrant<'_>, user: Principal) -> bool {
    user.role == Role::Admin || dashboard.created_by == user.id
}

/// A comment may be deleted by its author, an ADMIN of the dashboard's
/// company, or a SUPER_ADMIN.
pub fn can_delete_comment(
    author_id: DbId,
    dashboard_company_id: Option<DbId>,
    user: Principal,
) -> bool {
    if author_id == user.id || user.role == Role::SuperAdmin {
        return true;
    }
    user.role == Role::Admin
        && user.company_id.is_some()
        && user.company_id == dashboard_company_id
}
