use thiserror::Error;
use tracing::warn;

use stockroom_auth::AuthzError;
use stockroom_core::{DomainError, ModelName, Username};

use crate::store::StoreError;

/// Outcome error of a domain service operation.
///
/// Rule violations and the entity-specific readings of gateway failures
/// (`NotFound`, `AlreadyExists`) arrive as [`DomainError`]s. Any other
/// gateway fault is surfaced unchanged as `Store`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("store error: {0}")]
    Store(StoreError),
}

impl ServiceError {
    /// The domain error kind, when this is not a storage fault.
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            ServiceError::Domain(e) => Some(e),
            ServiceError::Store(_) => None,
        }
    }
}

/// Gateway failure with no entity-specific reading (listings, bulk deletes).
pub(crate) fn store_fault(err: StoreError) -> ServiceError {
    warn!(error = %err, "gateway failure");
    ServiceError::Store(err)
}

impl From<AuthzError> for ServiceError {
    fn from(value: AuthzError) -> Self {
        ServiceError::Domain(value.into())
    }
}

/// Read a gateway failure on the user keyed by `username`.
pub(crate) fn user_store_error(username: &Username) -> impl FnOnce(StoreError) -> ServiceError + '_ {
    move |err| match err {
        StoreError::NotFound => DomainError::user_not_found(username).into(),
        StoreError::AlreadyExists => DomainError::UserAlreadyExists(username.to_string()).into(),
        StoreError::Conflict => {
            DomainError::conflict(format!("user {username} was modified concurrently")).into()
        }
        other => {
            warn!(%username, error = %other, "user gateway failure");
            ServiceError::Store(other)
        }
    }
}

/// Read a gateway failure on the product keyed by `model`.
pub(crate) fn product_store_error(model: &ModelName) -> impl FnOnce(StoreError) -> ServiceError + '_ {
    move |err| match err {
        StoreError::NotFound => DomainError::product_not_found(model).into(),
        StoreError::AlreadyExists => DomainError::ProductAlreadyExists(model.to_string()).into(),
        StoreError::Conflict => {
            DomainError::conflict(format!("product {model} was modified concurrently")).into()
        }
        other => {
            warn!(%model, error = %other, "product gateway failure");
            ServiceError::Store(other)
        }
    }
}
