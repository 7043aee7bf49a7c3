// Remote ledger client interface
//
// This crate defines the seam between the console and the remote ledger:
// the `LedgerClient` trait every backend implements, the wire-facing value
// types it exchanges, and an in-memory backend used by tests and by the
// demo console. Transport, signing, and byte-level call encoding live
// behind the trait and are not modeled here.

pub mod client;
pub mod error;
pub mod memory;

pub use client::{
    LedgerClient, ModuleHandle, ModuleSlot, PreparedCall, TokenDetails, TransactionReceipt,
    TransactionStatus,
};
pub use error::{LedgerError, LedgerResult};
pub use memory::{MemoryLedger, SubmittedCall};
