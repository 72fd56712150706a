//! Authorization policy over user accounts.
//!
//! Decisions are split in two phases:
//!
//! 1. [`can_act_on`] runs before any storage access and only needs the
//!    actor's own claims plus the identifier the request names.
//! 2. [`check_target`] runs once the target's snapshot has been fetched, for
//!    the rules that depend on who the target is (e.g. its role).
//!
//! - No IO
//! - No panics
//! - No side effects

use thiserror::Error;

use stockroom_core::{DomainError, Username};

use crate::{Actor, User};

/// Operation an actor attempts, together with the user it targets (if any).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Operation<'a> {
    ViewProfile(&'a Username),
    UpdateProfile(&'a Username),
    DeleteUser(&'a Username),
    ListUsers,
    DeleteAllUsers,
    /// Register, restock, sell, list or delete products.
    ManageInventory,
    /// Browse products that are currently in stock.
    BrowseCatalog,
}

impl Operation<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::ViewProfile(_) => "view_profile",
            Operation::UpdateProfile(_) => "update_profile",
            Operation::DeleteUser(_) => "delete_user",
            Operation::ListUsers => "list_users",
            Operation::DeleteAllUsers => "delete_all_users",
            Operation::ManageInventory => "manage_inventory",
            Operation::BrowseCatalog => "browse_catalog",
        }
    }
}

#[derive(Debug, Error, Copy, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("user is not authorized to access this resource")]
    UnauthorizedUser,

    #[error("user is not an admin")]
    UserNotAdmin,

    #[error("admin accounts cannot be deleted")]
    UserIsAdmin,

    #[error("user is not an admin or manager")]
    UserNotManagerOrAdmin,
}

impl From<AuthzError> for DomainError {
    fn from(value: AuthzError) -> Self {
        match value {
            AuthzError::UnauthorizedUser => DomainError::UnauthorizedUser,
            AuthzError::UserNotAdmin => DomainError::UserNotAdmin,
            AuthzError::UserIsAdmin => DomainError::UserIsAdmin,
            AuthzError::UserNotManagerOrAdmin => DomainError::UserNotManagerOrAdmin,
        }
    }
}

/// Decide whether `actor` may attempt `operation` at all.
///
/// Passing this check does not guarantee success: deleting a user still
/// requires [`check_target`] on the fetched account when the actor is Admin.
pub fn can_act_on(actor: &Actor, operation: &Operation<'_>) -> Result<(), AuthzError> {
    match *operation {
        Operation::ViewProfile(target) => {
            if actor.is_admin() || actor.is(target) {
                Ok(())
            } else {
                Err(AuthzError::UnauthorizedUser)
            }
        }
        Operation::UpdateProfile(target) | Operation::DeleteUser(target) => {
            if actor.is_admin() || actor.is(target) {
                Ok(())
            } else {
                Err(AuthzError::UserNotAdmin)
            }
        }
        Operation::ListUsers | Operation::DeleteAllUsers => {
            if actor.is_admin() {
                Ok(())
            } else {
                Err(AuthzError::UserNotAdmin)
            }
        }
        Operation::ManageInventory => {
            if actor.role().can_manage_inventory() {
                Ok(())
            } else {
                Err(AuthzError::UserNotManagerOrAdmin)
            }
        }
        Operation::BrowseCatalog => Ok(()),
    }
}

/// Rules that depend on the fetched target account.
///
/// Admin accounts are never deletable, including by themselves. Updating
/// another Admin's profile stays allowed.
pub fn check_target(actor: &Actor, operation: &Operation<'_>, target: &User) -> Result<(), AuthzError> {
    match operation {
        Operation::DeleteUser(_) if actor.is_admin() && target.role.is_admin() => {
            Err(AuthzError::UserIsAdmin)
        }
        _ => Ok(()),
    }
}

/// Whether the operation needs the target's snapshot before it can proceed.
pub fn needs_target(actor: &Actor, operation: &Operation<'_>) -> bool {
    matches!(operation, Operation::DeleteUser(_) if actor.is_admin())
}
