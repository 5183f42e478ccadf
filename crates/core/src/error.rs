//! Ledger error model.

use thiserror::Error;

/// Result type used across the ledger.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Ledger-level error.
///
/// Every failure a caller can observe is one of these variants; the ledger
/// never reports partial success. Deterministic domain failures (validation,
/// insufficient stock) and infrastructure failures (storage, contention) share
/// the taxonomy so the sell path has a single structured result.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LedgerError {
    /// A referenced entity does not exist. No state change.
    #[error("{what} not found")]
    NotFound { what: String },

    /// A requested quantity was non-positive or not a finite number.
    /// Rejected before any storage access.
    #[error("invalid quantity: {given}")]
    InvalidQuantity { given: f64 },

    /// The requested withdrawal exceeds the current on-hand quantity.
    /// No partial decrement, no sale record.
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: f64, available: f64 },

    /// Contention on the same entry exceeded the configured lock wait.
    /// The caller may retry; no state change.
    #[error("ledger busy, retry later")]
    Busy,

    /// A uniqueness rule was violated on an administrative write
    /// (duplicate product name, duplicate product/color pair).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A value failed validation (e.g. empty name, malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// The underlying store is unreachable or failed. Fails closed.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl LedgerError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    pub fn invalid_quantity(given: f64) -> Self {
        Self::InvalidQuantity { given }
    }

    pub fn insufficient(requested: f64, available: f64) -> Self {
        Self::InsufficientStock {
            requested,
            available,
        }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Whether retrying the same call unchanged can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Busy)
    }
}
