use thiserror::Error;

use tallybook_core::DomainError;
use tallybook_store::StoreError;

/// Result type for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Failures surfaced to the invoking collaborator (the UI layer).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Client-side validation or invariant failure; the store was not called.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The store call failed; the local projection was left untouched.
    #[error(transparent)]
    Store(#[from] StoreError),
}
