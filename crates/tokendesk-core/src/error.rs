// Error types for console operations
//
// Every remote failure is translated into one of these kinds at the
// operation boundary that issued it; nothing crosses the dispatcher
// boundary untranslated.

use thiserror::Error;

use tokendesk_ledger::LedgerError;

/// Reasons a guarded action is refused before any remote write is attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IneligibleReason {
    /// The issuer has permanently ended minting
    #[error("minting has been permanently disabled by issuer")]
    MintingFinished,

    /// An offering module occupies slot 0
    #[error("an offering is attached")]
    OfferingAttached,

    /// No transfer manager is attached to act as whitelist authority
    #[error("GeneralTransferManager is not attached")]
    NoTransferManager,
}

/// Errors surfaced by console operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsoleError {
    /// The symbol does not resolve to a registered token
    #[error("token symbol {0} is not a registered security token")]
    TokenNotFound(String),

    /// The active account did not issue the resolved token
    #[error("the active account did not issue the security token {symbol}")]
    NotAuthorized {
        /// Symbol of the token the account does not own
        symbol: String,
    },

    /// A precondition refused the action; no remote write occurred
    #[error("{0}")]
    Ineligible(#[from] IneligibleReason),

    /// The prepared call could not be estimated (it would revert)
    #[error("estimation failed: {0}")]
    Estimation(String),

    /// The network rejected the call or the receipt reports failure
    #[error("submission failed: {0}")]
    Submission(String),

    /// A remote read failed outside the estimate/submit cycle
    #[error("ledger query failed: {0}")]
    Ledger(String),

    /// No module occupies the selected listing position
    #[error("no module at position {0}")]
    UnknownModule(usize),

    /// The action is a deliberate stub
    #[error("this option is not yet available")]
    NotAvailable,

    /// Deployment addresses could not be resolved; the session cannot start
    #[error("setup failed: {0}")]
    Setup(String),
}

impl From<LedgerError> for ConsoleError {
    fn from(err: LedgerError) -> Self {
        ConsoleError::Ledger(err.to_string())
    }
}

/// Convenient Result type for console operations
pub type ConsoleResult<T> = Result<T, ConsoleError>;
