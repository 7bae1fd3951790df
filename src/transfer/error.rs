//! Ledger Error Types
//!
//! One error type for the whole ledger core. Storage "no such row" stays
//! distinguishable as `NotFound` so callers can map it to a 404.

use std::time::Duration;

use thiserror::Error;

/// Postgres SQLSTATE for foreign_key_violation
const PG_FOREIGN_KEY_VIOLATION: &str = "23503";
/// Postgres SQLSTATE for unique_violation
const PG_UNIQUE_VIOLATION: &str = "23505";
/// Postgres SQLSTATE for check_violation
const PG_CHECK_VIOLATION: &str = "23514";

/// Ledger error types
#[derive(Error, Debug)]
pub enum LedgerError {
    // === Row Errors ===
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Constraint violation: {0}")]
    Constraint(String),

    // === Input Errors ===
    #[error("Transfer amount must be greater than zero, got {0}")]
    InvalidAmount(i64),

    // === Concurrency Errors ===
    #[error("Timed out waiting for row lock on account {0}")]
    LockTimeout(i64),

    #[error("Transfer deadline of {0:?} exceeded")]
    Timeout(Duration),

    // === Storage Errors ===
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    /// Work failed and the rollback that followed failed too; the session
    /// may be stuck and needs operator attention.
    #[error("tx error: {source}, rb error: {rollback}")]
    Rollback {
        source: Box<LedgerError>,
        rollback: Box<LedgerError>,
    },
}

impl LedgerError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        LedgerError::NotFound { entity, id }
    }

    /// True for a missing row, looking through a failed rollback
    pub fn is_not_found(&self) -> bool {
        match self {
            LedgerError::NotFound { .. } => true,
            LedgerError::Rollback { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::NotFound { .. } => "NOT_FOUND",
            LedgerError::Constraint(_) => "CONSTRAINT_VIOLATION",
            LedgerError::InvalidAmount(_) => "INVALID_AMOUNT",
            LedgerError::LockTimeout(_) => "LOCK_TIMEOUT",
            LedgerError::Timeout(_) => "TIMEOUT",
            LedgerError::Database(_) | LedgerError::Storage(_) => "STORAGE_ERROR",
            LedgerError::Rollback { .. } => "ROLLBACK_FAILED",
        }
    }

    /// Get HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            LedgerError::NotFound { .. } => 404,
            LedgerError::InvalidAmount(_) => 400,
            LedgerError::Constraint(_)
            | LedgerError::LockTimeout(_)
            | LedgerError::Timeout(_)
            | LedgerError::Database(_)
            | LedgerError::Storage(_)
            | LedgerError::Rollback { .. } => 500,
        }
    }
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            #[allow(clippy::collapsible_if)]
            if let Some(code) = db_err.code() {
                if code == PG_FOREIGN_KEY_VIOLATION
                    || code == PG_UNIQUE_VIOLATION
                    || code == PG_CHECK_VIOLATION
                {
                    return LedgerError::Constraint(db_err.message().to_string());
                }
            }
        }
        LedgerError::Database(e)
    }
}
