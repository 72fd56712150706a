//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every rule in the engine fails fast with exactly one of these kinds.
/// Storage faults are not represented here; they travel alongside as a
/// separate infrastructure error so callers can tell them apart.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The username does not resolve to a stored user.
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// The model does not resolve to a stored product.
    #[error("product not found: {0}")]
    ProductNotFound(String),

    /// A user with the same username already exists.
    #[error("user already exists: {0}")]
    UserAlreadyExists(String),

    /// A product with the same model already exists.
    #[error("product already exists: {0}")]
    ProductAlreadyExists(String),

    /// The actor has no viewing rights over the target user.
    #[error("user is not authorized to access this resource")]
    UnauthorizedUser,

    /// A cross-user action was attempted without the Admin role.
    #[error("user is not an admin")]
    UserNotAdmin,

    /// Deletion of an Admin account was attempted (including self-deletion).
    #[error("admin accounts cannot be deleted")]
    UserIsAdmin,

    /// Inventory management was attempted by an actor that is neither Admin nor Manager.
    #[error("user is not an admin or manager")]
    UserNotManagerOrAdmin,

    /// A supplied date violates the arrival/today ordering.
    #[error("invalid date: {0}")]
    DateError(String),

    /// A sale requested more units than are available.
    #[error("insufficient stock: requested {requested}, available {available}")]
    LowProductStock { requested: u32, available: u32 },

    /// The record changed between the read a decision was based on and the
    /// write that would apply it.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A value failed validation (re-checked shape invariant).
    #[error("validation failed: {0}")]
    Validation(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn date(msg: impl Into<String>) -> Self {
        Self::DateError(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn user_not_found(username: impl core::fmt::Display) -> Self {
        Self::UserNotFound(username.to_string())
    }

    pub fn product_not_found(model: impl core::fmt::Display) -> Self {
        Self::ProductNotFound(model.to_string())
    }

    /// Stable machine-readable code, handy for logs and transport mapping.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::UserNotFound(_) => "user_not_found",
            DomainError::ProductNotFound(_) => "product_not_found",
            DomainError::UserAlreadyExists(_) => "user_already_exists",
            DomainError::ProductAlreadyExists(_) => "product_already_exists",
            DomainError::UnauthorizedUser => "unauthorized_user",
            DomainError::UserNotAdmin => "user_not_admin",
            DomainError::UserIsAdmin => "user_is_admin",
            DomainError::UserNotManagerOrAdmin => "user_not_manager_or_admin",
            DomainError::DateError(_) => "date_error",
            DomainError::LowProductStock { .. } => "low_product_stock",
            DomainError::Conflict(_) => "conflict",
            DomainError::Validation(_) => "validation_error",
        }
    }
}
