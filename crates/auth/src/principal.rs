use stockroom_core::Username;

use crate::{Role, User};

/// The authenticated caller.
///
/// Built by the credential-verification collaborator from the stored account
/// it just verified. The engine trusts this snapshot as-is and never
/// re-fetches it, so acting on oneself needs no gateway round-trip.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    user: User,
}

impl Actor {
    pub fn new(user: User) -> Self {
        Self { user }
    }

    pub fn username(&self) -> &Username {
        &self.user.username
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn is_admin(&self) -> bool {
        self.user.role.is_admin()
    }

    /// Whether `username` names the actor itself.
    pub fn is(&self, username: &Username) -> bool {
        self.user.username == *username
    }

    pub fn user(&self) -> &User {
        &self.user
    }
}

impl From<User> for Actor {
    fn from(value: User) -> Self {
        Self::new(value)
    }
}
