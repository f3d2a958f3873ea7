//! Role-based authorization hierarchy for account management.
//!
//! A pure decision function over two user records; no I/O. Handlers map
//! [`Access::Denied`] to 403 and [`Access::NotSupported`] to 406.

use crate::error::{AppError, Result};
use crate::models::User;

/// Account-level operation being authorized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountAction {
    Update,
    Delete,
}

/// Outcome of an authorization check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    Denied,
    /// Superadmin deprovisioning is not supported through the standard
    /// delete path, regardless of target.
    NotSupported,
}

/// Decide whether `actor` may perform `action` on `target`'s account.
///
/// Rules are evaluated in order: the superadmin delete prohibition first,
/// then self-service, then the admin hierarchy (admins may not manage
/// peer admins or superadmins).
pub fn can_manage(actor: &User, target: &User, action: AccountAction) -> Access {
    if actor.is_superadmin() && action == AccountAction::Delete {
        return Access::NotSupported;
    }
    if target.id == actor.id {
        return Access::Granted;
    }
    if !actor.is_admin() && !actor.is_superadmin() {
        return Access::Denied;
    }
    if target.is_superadmin() && actor.is_admin() && !actor.is_superadmin() {
        return Access::Denied;
    }
    if target.is_admin() && actor.is_admin() && !actor.is_superadmin() {
        return Access::Denied;
    }
    Access::Granted
}

/// Convert an access decision into a handler result
pub fn require(access: Access) -> Result<()> {
    match access {
        Access::Granted => Ok(()),
        Access::Denied => Err(AppError::Forbidden),
        Access::NotSupported => Err(AppError::SuperadminImmutable),
    }
}
