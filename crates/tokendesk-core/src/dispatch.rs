// Action dispatch
//
// Maps a selected action to its precondition checks, a cost estimate with a
// safety margin, and a guarded submit-and-confirm cycle. Nothing retries:
// every failure is terminal for the action, and the shell returns to the
// menu through a fresh enumeration either way.

use std::fmt;

use tracing::{debug, info};

use tokendesk_ledger::{LedgerClient, PreparedCall, TransactionReceipt, TransactionStatus};
use tokendesk_types::{Address, Timestamp, TokenAmount};

use crate::error::{ConsoleError, IneligibleReason};
use crate::precondition;
use crate::registry::ModuleRegistry;
use crate::session::Session;

/// Whitelist validity window: one Julian year in seconds
pub const WHITELIST_VALIDITY_SECS: u64 = 31_556_952;

/// Safety margin applied to gas estimates
const DEFAULT_GAS_MARGIN: f64 = 1.2;

/// Removal is costlier and less predictable; budgeted more conservatively
const REMOVAL_GAS_MARGIN: f64 = 2.0;

/// The closed set of console actions, in menu order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Attach a new module (stub)
    AddModule,
    /// Pause or unpause a module (stub)
    PauseModule,
    /// Detach an attached module
    RemoveModule,
    /// Change a module's fee budget (stub)
    ChangeBudget,
    /// Whitelist an address for a year
    Whitelist,
    /// Mint tokens to an address
    Mint,
    /// Permanently end issuer minting
    EndMintingIssuer,
    /// Permanently end offering minting
    EndMintingSto,
    /// Leave the console
    Exit,
}

impl Action {
    /// Menu ordering presented by the shell
    pub const MENU: [Action; 9] = [
        Action::AddModule,
        Action::PauseModule,
        Action::RemoveModule,
        Action::ChangeBudget,
        Action::Whitelist,
        Action::Mint,
        Action::EndMintingIssuer,
        Action::EndMintingSto,
        Action::Exit,
    ];

    /// Operator-facing menu label
    pub fn label(&self) -> &'static str {
        match self {
            Action::AddModule => "Add a module",
            Action::PauseModule => "Pause / unpause a module",
            Action::RemoveModule => "Remove a module",
            Action::ChangeBudget => "Change module budget",
            Action::Whitelist => "Whitelist an address for a year",
            Action::Mint => "Mint tokens",
            Action::EndMintingIssuer => "End minting for Issuer",
            Action::EndMintingSto => "End minting for STO",
            Action::Exit => "Exit",
        }
    }

    /// Whether the action is a deliberate stub, surfaced as "not available"
    /// without entering the dispatch state machine
    pub fn is_stub(&self) -> bool {
        matches!(
            self,
            Action::AddModule | Action::PauseModule | Action::ChangeBudget
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A selected action joined with the operands the shell collected for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionRequest {
    /// Attach a new module (stub)
    AddModule,
    /// Pause or unpause a module (stub)
    PauseModule,
    /// Change a module's fee budget (stub)
    ChangeBudget,
    /// Remove the module at a flattened listing position
    RemoveModule {
        /// Position in the flattened listing
        position: usize,
    },
    /// Whitelist an address for a year
    Whitelist {
        /// Address to whitelist
        investor: Address,
    },
    /// Mint tokens. The amount stays a raw decimal string until dispatch;
    /// conversion is the only validation it ever gets.
    Mint {
        /// Recipient of the minted tokens
        to: Address,
        /// Operator-entered decimal amount
        amount: String,
    },
    /// Permanently end issuer minting
    EndMintingIssuer,
    /// Permanently end offering minting
    EndMintingSto,
}

impl ActionRequest {
    /// The action identifier this request carries
    pub fn action(&self) -> Action {
        match self {
            ActionRequest::AddModule => Action::AddModule,
            ActionRequest::PauseModule => Action::PauseModule,
            ActionRequest::ChangeBudget => Action::ChangeBudget,
            ActionRequest::RemoveModule { .. } => Action::RemoveModule,
            ActionRequest::Whitelist { .. } => Action::Whitelist,
            ActionRequest::Mint { .. } => Action::Mint,
            ActionRequest::EndMintingIssuer => Action::EndMintingIssuer,
            ActionRequest::EndMintingSto => Action::EndMintingSto,
        }
    }
}

/// Dispatch state machine phases. Terminal phases return control to the
/// shell, which re-enumerates back to Idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DispatchPhase {
    Evaluating,
    Estimating,
    Submitting,
    Confirmed,
    Failed,
}

/// Entity-specific success report for a confirmed action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    /// An address was whitelisted through the transfer manager
    Whitelisted {
        /// The whitelisted address
        investor: Address,
        /// End of the granted window
        until: Timestamp,
    },
    /// Tokens were minted
    Minted {
        /// Recipient
        to: Address,
        /// Minted quantity in base units
        amount: TokenAmount,
    },
    /// Issuer minting was permanently ended
    IssuerMintingEnded,
    /// Offering minting was permanently ended
    StoMintingEnded,
    /// A module was detached
    ModuleRemoved {
        /// Name of the removed module
        name: String,
    },
}

impl fmt::Display for Confirmation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confirmation::Whitelisted { investor, .. } => {
                write!(f, "Whitelisting successful for {investor}.")
            }
            Confirmation::Minted { to, amount } => {
                write!(f, "Minting successful: {amount} base units to {to}.")
            }
            Confirmation::IssuerMintingEnded => write!(f, "End minting for Issuer was successful."),
            Confirmation::StoMintingEnded => write!(f, "End minting for STO was successful."),
            Confirmation::ModuleRemoved { name } => write!(f, "Successfully removed {name}."),
        }
    }
}

/// Outcome of one dispatched action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The action was submitted and its receipt reports success
    Confirmed(Confirmation),
    /// A precondition refused the action; no remote write occurred
    Ineligible(IneligibleReason),
    /// Estimation or submission failed
    Failed(ConsoleError),
    /// The action is a deliberate stub
    NotAvailable,
}

/// Routes actions through preconditions, estimation, and guarded
/// submission against a single ledger client
pub struct Dispatcher<'a> {
    client: &'a dyn LedgerClient,
}

impl<'a> Dispatcher<'a> {
    /// Create a dispatcher over the session's ledger client
    pub fn new(client: &'a dyn LedgerClient) -> Self {
        Self { client }
    }

    /// Single selector mapping a request to its handler. Stubs
    /// short-circuit to `NotAvailable` without touching the ledger.
    pub async fn dispatch(
        &self,
        session: &Session,
        registry: &ModuleRegistry,
        request: ActionRequest,
    ) -> ActionOutcome {
        match request {
            ActionRequest::AddModule | ActionRequest::PauseModule | ActionRequest::ChangeBudget => {
                debug!(action = %request.action(), "stubbed action short-circuited");
                ActionOutcome::NotAvailable
            }
            ActionRequest::RemoveModule { position } => {
                self.remove_module(session, registry, position).await
            }
            ActionRequest::Whitelist { investor } => {
                self.whitelist(session, registry, investor).await
            }
            ActionRequest::Mint { to, amount } => self.mint(session, to, amount).await,
            ActionRequest::EndMintingIssuer => {
                self.end_minting(session, Action::EndMintingIssuer).await
            }
            ActionRequest::EndMintingSto => self.end_minting(session, Action::EndMintingSto).await,
        }
    }

    async fn whitelist(
        &self,
        session: &Session,
        registry: &ModuleRegistry,
        investor: Address,
    ) -> ActionOutcome {
        transition(Action::Whitelist, DispatchPhase::Evaluating);
        let manager = match precondition::transfer_manager(registry) {
            Ok(record) => record.handle.address(),
            Err(reason) => return refused(Action::Whitelist, reason),
        };
        // Window boundaries come from the remote clock, not the local one
        let now = match self.client.latest_timestamp().await {
            Ok(now) => now,
            Err(err) => return failed(Action::Whitelist, err.into()),
        };
        let expiry = now.plus_secs(WHITELIST_VALIDITY_SECS);
        let call = PreparedCall::ModifyWhitelist {
            manager,
            investor,
            from_time: now,
            to_time: now,
            expiry,
            can_transfer: true,
        };
        match self
            .estimate_and_submit(session, Action::Whitelist, call, DEFAULT_GAS_MARGIN)
            .await
        {
            Ok(_) => confirmed(
                Action::Whitelist,
                Confirmation::Whitelisted {
                    investor,
                    until: expiry,
                },
            ),
            Err(err) => failed(Action::Whitelist, err),
        }
    }

    async fn mint(&self, session: &Session, to: Address, amount: String) -> ActionOutcome {
        transition(Action::Mint, DispatchPhase::Evaluating);
        if let Err(err) = precondition::check_mint(self.client, session).await {
            return match err {
                ConsoleError::Ineligible(reason) => refused(Action::Mint, reason),
                other => failed(Action::Mint, other),
            };
        }
        // Converted, never validated: a malformed amount surfaces through
        // the failure path exactly like a revert would.
        let amount = match TokenAmount::from_decimal_str(&amount, session.token.decimals) {
            Ok(amount) => amount,
            Err(err) => return failed(Action::Mint, ConsoleError::Submission(err.to_string())),
        };
        let call = PreparedCall::Mint {
            token: session.token.address,
            to,
            amount,
        };
        match self
            .estimate_and_submit(session, Action::Mint, call, DEFAULT_GAS_MARGIN)
            .await
        {
            Ok(_) => confirmed(Action::Mint, Confirmation::Minted { to, amount }),
            Err(err) => failed(Action::Mint, err),
        }
    }

    async fn end_minting(&self, session: &Session, action: Action) -> ActionOutcome {
        // Idempotent-intent: redundant calls are a remote-side concern
        transition(action, DispatchPhase::Evaluating);
        let token = session.token.address;
        let (call, confirmation) = match action {
            Action::EndMintingSto => (
                PreparedCall::FinishMintingSto { token },
                Confirmation::StoMintingEnded,
            ),
            _ => (
                PreparedCall::FinishMintingIssuer { token },
                Confirmation::IssuerMintingEnded,
            ),
        };
        match self
            .estimate_and_submit(session, action, call, DEFAULT_GAS_MARGIN)
            .await
        {
            Ok(_) => confirmed(action, confirmation),
            Err(err) => failed(action, err),
        }
    }

    async fn remove_module(
        &self,
        session: &Session,
        registry: &ModuleRegistry,
        position: usize,
    ) -> ActionOutcome {
        transition(Action::RemoveModule, DispatchPhase::Evaluating);
        // The remote call takes (type, slot); the flattened position is a
        // display artifact and must not leak into the submission.
        let (module_type, slot, name) = match registry.resolve(position) {
            Some(entry) => (entry.module_type, entry.slot, entry.record.name.clone()),
            None => return failed(Action::RemoveModule, ConsoleError::UnknownModule(position)),
        };
        let call = PreparedCall::RemoveModule {
            token: session.token.address,
            module_type,
            slot,
        };
        match self
            .estimate_and_submit(session, Action::RemoveModule, call, REMOVAL_GAS_MARGIN)
            .await
        {
            Ok(_) => confirmed(Action::RemoveModule, Confirmation::ModuleRemoved { name }),
            Err(err) => failed(Action::RemoveModule, err),
        }
    }

    async fn estimate_and_submit(
        &self,
        session: &Session,
        action: Action,
        call: PreparedCall,
        margin: f64,
    ) -> Result<TransactionReceipt, ConsoleError> {
        transition(action, DispatchPhase::Estimating);
        let gas_limit = self
            .client
            .estimate_call(&call, session.user, margin)
            .await
            .map_err(|err| ConsoleError::Estimation(err.to_string()))?;
        transition(action, DispatchPhase::Submitting);
        let receipt = self
            .client
            .submit_call(call, session.user, gas_limit, session.gas_price)
            .await
            .map_err(|err| ConsoleError::Submission(err.to_string()))?;
        match &receipt.status {
            TransactionStatus::Success => Ok(receipt),
            TransactionStatus::Failure(message) => {
                Err(ConsoleError::Submission(message.clone()))
            }
        }
    }
}

fn transition(action: Action, phase: DispatchPhase) {
    debug!(%action, ?phase, "dispatch transition");
}

fn confirmed(action: Action, confirmation: Confirmation) -> ActionOutcome {
    transition(action, DispatchPhase::Confirmed);
    info!(%action, %confirmation, "action confirmed");
    ActionOutcome::Confirmed(confirmation)
}

fn refused(action: Action, reason: IneligibleReason) -> ActionOutcome {
    transition(action, DispatchPhase::Failed);
    ActionOutcome::Ineligible(reason)
}

fn failed(action: Action, err: ConsoleError) -> ActionOutcome {
    transition(action, DispatchPhase::Failed);
    ActionOutcome::Failed(err)
}
