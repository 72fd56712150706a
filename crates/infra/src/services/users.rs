//! User account operations.

use tracing::{info, instrument};

use stockroom_auth::{
    Actor, NewUser, Operation, ProfileUpdate, Role, User, UserFilter, check_target, needs_target,
};
use stockroom_core::{Clock, Username};

use super::error::{ServiceError, store_fault, user_store_error};
use super::{authorize, denied};
use crate::store::EntityStore;

/// Orchestrates the authorization policy and the user gateway.
///
/// Every operation runs its checks first and issues at most one mutating
/// gateway call, only once all checks have passed.
#[derive(Debug)]
pub struct UserService<S, C> {
    store: S,
    clock: C,
}

impl<S, C> UserService<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }
}

impl<S, C> UserService<S, C>
where
    S: EntityStore<User>,
    C: Clock,
{
    /// Register a new account. Registration needs no actor.
    #[instrument(skip_all, fields(username = %new.username, role = %new.role))]
    pub fn create_user(&self, new: NewUser) -> Result<User, ServiceError> {
        let username = new.username.clone();
        let user = User::register(new)?;

        let created = self
            .store
            .insert(user)
            .map_err(user_store_error(&username))?;

        info!("user created");
        Ok(created)
    }

    #[instrument(skip_all, fields(actor = %actor.username()))]
    pub fn get_users(&self, actor: &Actor) -> Result<Vec<User>, ServiceError> {
        authorize(actor, &Operation::ListUsers)?;
        self.store.list(&UserFilter::All).map_err(store_fault)
    }

    #[instrument(skip_all, fields(actor = %actor.username(), %role))]
    pub fn get_users_by_role(&self, actor: &Actor, role: Role) -> Result<Vec<User>, ServiceError> {
        authorize(actor, &Operation::ListUsers)?;
        self.store.list(&UserFilter::Role(role)).map_err(store_fault)
    }

    /// Self-views are answered from the actor's own snapshot.
    #[instrument(skip_all, fields(actor = %actor.username(), target = %username))]
    pub fn get_user_by_username(&self, actor: &Actor, username: &Username) -> Result<User, ServiceError> {
        authorize(actor, &Operation::ViewProfile(username))?;

        if actor.is(username) {
            return Ok(actor.user().clone());
        }

        self.store.get(username).map_err(user_store_error(username))
    }

    /// Delete one account.
    ///
    /// Non-Admins may only delete themselves. Admins may delete anyone except
    /// an Admin (themselves included); another user's account is fetched to
    /// find out, the actor's own is judged from its snapshot.
    #[instrument(skip_all, fields(actor = %actor.username(), target = %username))]
    pub fn delete_user(&self, actor: &Actor, username: &Username) -> Result<bool, ServiceError> {
        let operation = Operation::DeleteUser(username);
        authorize(actor, &operation)?;

        if needs_target(actor, &operation) {
            let fetched;
            let target = if actor.is(username) {
                actor.user()
            } else {
                fetched = self
                    .store
                    .get(username)
                    .map_err(user_store_error(username))?;
                &fetched
            };
            check_target(actor, &operation, target).map_err(|e| denied(actor, &operation, e))?;
        }

        let deleted = self
            .store
            .delete(username)
            .map_err(user_store_error(username))?;

        info!("user deleted");
        Ok(deleted)
    }

    /// Delete every non-Admin account. Returns how many were removed.
    #[instrument(skip_all, fields(actor = %actor.username()))]
    pub fn delete_all_users(&self, actor: &Actor) -> Result<usize, ServiceError> {
        authorize(actor, &Operation::DeleteAllUsers)?;

        let removed = self
            .store
            .delete_where(&UserFilter::NonAdmin)
            .map_err(store_fault)?;

        info!(removed, "non-admin users deleted");
        Ok(removed)
    }

    /// Replace the editable profile fields of `username`.
    #[instrument(skip_all, fields(actor = %actor.username(), target = %username))]
    pub fn update_user_info(
        &self,
        actor: &Actor,
        username: &Username,
        update: ProfileUpdate,
    ) -> Result<User, ServiceError> {
        authorize(actor, &Operation::UpdateProfile(username))?;

        let update = update.validated(self.clock.today())?;

        let updated = self
            .store
            .update_fields(username, &update)
            .map_err(user_store_error(username))?;

        info!("user profile updated");
        Ok(updated)
    }
}
