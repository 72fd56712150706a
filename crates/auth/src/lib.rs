//! `stockroom-auth`: pure authorization boundary over user accounts.
//!
//! This crate is intentionally decoupled from HTTP and storage: every decision
//! is a function of the acting user's snapshot and the target it names.

pub mod authorize;
pub mod principal;
pub mod roles;
pub mod user;

pub use authorize::{AuthzError, Operation, can_act_on, check_target, needs_target};
pub use principal::Actor;
pub use roles::Role;
pub use user::{NewUser, ProfileUpdate, User, UserFilter};
