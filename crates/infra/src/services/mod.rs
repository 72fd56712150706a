//! Domain service layer.
//!
//! Services sit between the API layer and the persistence gateway. They
//! compose the pure authorization policy and consistency rules with an
//! injected [`EntityStore`](crate::store::EntityStore) and
//! [`Clock`](stockroom_core::Clock), and translate gateway failures into
//! domain errors.

use tracing::debug;

use stockroom_auth::{Actor, AuthzError, Operation, can_act_on};

pub mod error;
pub mod products;
pub mod users;

pub use error::ServiceError;
pub use products::ProductService;
pub use users::UserService;

pub(crate) fn authorize(actor: &Actor, operation: &Operation<'_>) -> Result<(), ServiceError> {
    can_act_on(actor, operation).map_err(|e| denied(actor, operation, e))
}

pub(crate) fn denied(actor: &Actor, operation: &Operation<'_>, err: AuthzError) -> ServiceError {
    debug!(
        actor = %actor.username(),
        role = %actor.role(),
        operation = operation.name(),
        reason = %err,
        "operation denied"
    );
    err.into()
}
