//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// lifecycle rules, accounting invariants). Every variant is the synchronous
/// outcome of a single operation; nothing here is retried internally.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. non-positive amount, empty title).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// The referenced expense has no record in the store.
    #[error("expense not found")]
    ExpenseNotFound,

    /// The operation referenced a member outside the expense's group.
    #[error("member not in group: {0}")]
    MemberNotInGroup(String),

    /// The operation is not permitted in the expense's current status
    /// (e.g. mutating a settled expense, or a backward status transition).
    #[error("invalid expense state: {0}")]
    InvalidExpenseState(String),

    /// A contribution was attempted against an already-settled expense.
    ///
    /// Distinguished from [`DomainError::InvalidExpenseState`]: this is the
    /// dominant, expected failure mode on the contribution path and callers
    /// match on it directly.
    #[error("expense already settled")]
    ExpenseSettled,

    /// A contribution would push a member's accumulated total above their
    /// assigned share. Partial contributions are allowed, over-payment is not.
    #[error("contribution exceeds share: share {share}, contributed {contributed}, attempted {attempted}")]
    ContributionExceeded {
        share: u64,
        contributed: u64,
        attempted: u64,
    },

    /// Non-domain failure inside the core (lock poisoning). Surfaced rather
    /// than unwrapped; callers treat it as fatal for the current operation.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidExpenseState(msg.into())
    }

    pub fn member_not_in_group(member: impl Into<String>) -> Self {
        Self::MemberNotInGroup(member.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
