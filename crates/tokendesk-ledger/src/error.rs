// Error types for ledger clients

use thiserror::Error;

/// Errors surfaced by a ledger client. Every remote failure a backend can
/// produce is folded into one of these kinds before it reaches a caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The queried entity is not registered on the ledger
    #[error("not found: {0}")]
    NotFound(String),

    /// The node could not be reached or rejected the request
    #[error("transport error: {0}")]
    Transport(String),

    /// The call was executed and reverted
    #[error("execution reverted: {0}")]
    Reverted(String),
}

impl LedgerError {
    /// Create a new not-found error
    pub fn not_found(message: impl Into<String>) -> Self {
        LedgerError::NotFound(message.into())
    }

    /// Create a new transport error
    pub fn transport(message: impl Into<String>) -> Self {
        LedgerError::Transport(message.into())
    }

    /// Create a new revert error
    pub fn reverted(message: impl Into<String>) -> Self {
        LedgerError::Reverted(message.into())
    }
}

/// Convenient Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
