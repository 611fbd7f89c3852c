//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;
use uuid::Uuid;

/// Domain-specific errors
///
/// These errors represent business rule violations and domain invariant
/// failures. They are independent of the web/infrastructure layer and are
/// never retried by the core.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Amount is zero, negative, malformed, or out of range
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Debit exceeds the wallet balance
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        required: rust_decimal::Decimal,
        available: rust_decimal::Decimal,
    },

    /// User not found
    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    /// Acting admin not found
    #[error("Admin not found: {0}")]
    AdminNotFound(Uuid),

    /// Invitation not found
    #[error("Invitation not found: {0}")]
    InvitationNotFound(Uuid),

    /// Template not found or inactive
    #[error("Template not found: {0}")]
    TemplateNotFound(Uuid),

    /// Package not found or inactive
    #[error("Package not found: {0}")]
    PackageNotFound(Uuid),

    /// Caller does not own the invitation
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Invitation already left the draft state
    #[error("Invitation is already published")]
    AlreadyPublished,

    /// Top-up request not found
    #[error("Top-up request not found: {0}")]
    RequestNotFound(Uuid),

    /// Top-up request already left the pending state
    #[error("Top-up request already processed")]
    AlreadyProcessed,
}

impl DomainError {
    /// Create an insufficient balance error
    pub fn insufficient_balance(
        required: rust_decimal::Decimal,
        available: rust_decimal::Decimal,
    ) -> Self {
        Self::InsufficientBalance {
            required,
            available,
        }
    }

    /// Create a permission denied error
    pub fn permission_denied(reason: impl Into<String>) -> Self {
        Self::PermissionDenied(reason.into())
    }

    /// Check if this is a not-found error (404-class)
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_)
                | Self::AdminNotFound(_)
                | Self::InvitationNotFound(_)
                | Self::TemplateNotFound(_)
                | Self::PackageNotFound(_)
                | Self::RequestNotFound(_)
        )
    }

    /// Check if this is a state conflict (the entity exists but already
    /// made its one-way transition)
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::AlreadyPublished | Self::AlreadyProcessed)
    }
}

impl From<super::MoneyError> for DomainError {
    fn from(err: super::MoneyError) -> Self {
        DomainError::InvalidAmount(err.to_string())
    }
}
