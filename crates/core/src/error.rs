//! Ledger error model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across the ledger.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Field-to-message mapping for validation failures.
///
/// Callers can surface this map verbatim next to the offending form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-field shorthand.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.0
    }

    /// Finish a validation pass: `Ok(())` when no field failed.
    pub fn into_result(self) -> LedgerResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(LedgerError::Validation(self))
        }
    }
}

impl core::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Ledger-level error.
///
/// Keep this focused on deterministic business failures (validation,
/// invariants, conflicts). Transport concerns belong to the API layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Malformed or missing input; carries a field-to-message map.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// A referenced entity or operation does not exist (or is inactive).
    #[error("not found: {0}")]
    NotFound(String),

    /// Duplicate creation or a state that forbids the request.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The adjustment would drive a stock balance negative.
    #[error("insufficient stock: {0}")]
    InsufficientStock(String),

    /// Cumulative returns would exceed the original line's quantity.
    #[error("over-return: {0}")]
    OverReturn(String),

    /// The submitted `old_quantity` no longer matches the line.
    #[error("stale modification: {0}")]
    StaleModification(String),

    /// Storage or wiring failure; safe for the caller to retry.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(FieldErrors::single(field, message))
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn insufficient_stock(msg: impl Into<String>) -> Self {
        Self::InsufficientStock(msg.into())
    }

    pub fn over_return(msg: impl Into<String>) -> Self {
        Self::OverReturn(msg.into())
    }

    pub fn stale_modification(msg: impl Into<String>) -> Self {
        Self::StaleModification(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
