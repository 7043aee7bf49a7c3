// Core of the tokendesk console
//
// Everything with real control flow lives here: the module enumerator that
// probes the remote slot lists, the registry it rebuilds on every pass, the
// precondition evaluators, and the action dispatcher that runs guarded
// state changes through estimate-submit-confirm. The console shell consumes
// this crate; the remote ledger is reached through `tokendesk_ledger`.

pub mod dispatch;
pub mod enumerate;
pub mod error;
pub mod precondition;
pub mod registry;
pub mod session;

pub use dispatch::{
    Action, ActionOutcome, ActionRequest, Confirmation, Dispatcher, WHITELIST_VALIDITY_SECS,
};
pub use enumerate::{enumerate, enumerate_all};
pub use error::{ConsoleError, ConsoleResult, IneligibleReason};
pub use registry::{FlatEntry, ModuleRecord, ModuleRegistry};
pub use session::{Session, DEFAULT_MAX_SLOTS};
