//! Errors the ledger engine can return.
//!
//! The engine fails fast and never logs or retries; translating these into
//! user-facing responses is the server's job.

use sea_orm::DbErr;
use thiserror::Error;

/// Engine error taxonomy.
///
/// - [`Validation`]: a required field is missing or malformed.
/// - [`NotFound`]: a referenced group/member/transaction/share does not exist
///   (or is not visible to the caller).
/// - [`Conflict`]: a uniqueness rule was violated (duplicate email).
/// - [`Integrity`]: stored or supplied data does not reconcile (share sums).
///
/// [`Validation`]: EngineError::Validation
/// [`NotFound`]: EngineError::NotFound
/// [`Conflict`]: EngineError::Conflict
/// [`Integrity`]: EngineError::Integrity
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("integrity violation: {0}")]
    Integrity(String),
    #[error("invalid cursor: {0}")]
    InvalidCursor(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Integrity(a), Self::Integrity(b)) => a == b,
            (Self::InvalidCursor(a), Self::InvalidCursor(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
