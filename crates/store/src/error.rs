use thiserror::Error;

/// Result type for record store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures at the record store boundary.
///
/// Store failures are surfaced to the invoking collaborator and must never
/// feed an optimistic projection update.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No connection/session with the store; blocks all mutations and reads.
    #[error("record store unavailable: {0}")]
    Unavailable(String),

    /// The store rejected the operation.
    #[error("store operation failed: {0}")]
    Operation(String),
}

impl StoreError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn operation(msg: impl Into<String>) -> Self {
        Self::Operation(msg.into())
    }
}
