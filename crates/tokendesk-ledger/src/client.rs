// Ledger client trait and wire-facing value types
//
// The console issues every remote read and write through `LedgerClient`.
// Calls are typed (`PreparedCall`); encoding them for the wire is the
// backend's concern.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use tokendesk_types::{
    Address, BlockHeight, Bytes32, ModuleType, Timestamp, TokenAmount, TransactionId,
};

use crate::error::LedgerResult;

/// Metadata of a registered security token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDetails {
    /// Token contract address
    pub address: Address,
    /// Ticker symbol
    pub symbol: String,
    /// Account recorded as the token's issuer
    pub issuer: Address,
    /// Total supply in base units
    pub total_supply: TokenAmount,
    /// Base-unit scaling factor
    pub decimals: u8,
}

/// One slot of the per-type module list as the registry contract reports
/// it. A zero address marks the slot after the last attached module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSlot {
    /// Module name in the registry's fixed-width encoding
    pub raw_name: Bytes32,
    /// Module contract address, zero when the slot is empty
    pub address: Address,
    /// Whether the registry has locked the module
    pub locked: bool,
}

impl ModuleSlot {
    /// The empty slot, as the registry reports past the end of the list
    pub const EMPTY: ModuleSlot = ModuleSlot {
        raw_name: Bytes32::ZERO,
        address: Address::ZERO,
        locked: false,
    };

    /// Whether this slot is the end-of-list sentinel
    pub fn is_sentinel(&self) -> bool {
        self.address.is_zero()
    }
}

/// Capability for issuing calls against one attached module instance.
/// Binding resolves the kind-specific call schema for the instance; the
/// handle is owned by the module record that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleHandle {
    module_type: ModuleType,
    address: Address,
}

impl ModuleHandle {
    /// Bind a handle to a module instance of the given kind
    pub fn bind(module_type: ModuleType, address: Address) -> Self {
        Self {
            module_type,
            address,
        }
    }

    /// Kind of the module behind this handle
    pub fn module_type(&self) -> ModuleType {
        self.module_type
    }

    /// Address of the module instance
    pub fn address(&self) -> Address {
        self.address
    }
}

/// A state-changing call, fully parameterized but not yet encoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreparedCall {
    /// Detach the module at `slot` of the given type from the token
    RemoveModule {
        token: Address,
        module_type: ModuleType,
        slot: u64,
    },
    /// Grant an address a transfer window on the transfer manager
    ModifyWhitelist {
        manager: Address,
        investor: Address,
        from_time: Timestamp,
        to_time: Timestamp,
        expiry: Timestamp,
        can_transfer: bool,
    },
    /// Issue new tokens to an address
    Mint {
        token: Address,
        to: Address,
        amount: TokenAmount,
    },
    /// Permanently end issuer minting on the token
    FinishMintingIssuer { token: Address },
    /// Permanently end offering minting on the token
    FinishMintingSto { token: Address },
}

impl PreparedCall {
    /// Short identifier for tracing
    pub fn kind(&self) -> &'static str {
        match self {
            PreparedCall::RemoveModule { .. } => "remove_module",
            PreparedCall::ModifyWhitelist { .. } => "modify_whitelist",
            PreparedCall::Mint { .. } => "mint",
            PreparedCall::FinishMintingIssuer { .. } => "finish_minting_issuer",
            PreparedCall::FinishMintingSto { .. } => "finish_minting_sto",
        }
    }
}

impl fmt::Display for PreparedCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind())
    }
}

/// Outcome of an executed transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Transaction executed successfully
    Success,
    /// Transaction was included but reverted
    Failure(String),
}

impl TransactionStatus {
    /// Whether the transaction succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, TransactionStatus::Success)
    }
}

/// Confirmation receipt for a submitted transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    /// Transaction ID
    pub transaction_id: TransactionId,
    /// Block height where the transaction was included
    pub block_height: BlockHeight,
    /// Execution status
    pub status: TransactionStatus,
    /// Gas consumed, when the backend reports it
    pub gas_used: Option<u64>,
}

/// Client interface to the remote ledger. Implementations are responsible
/// for transport, signing, and call encoding; callers never retry, so every
/// failure is terminal for the operation that issued it.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Resolve a token symbol to its contract address
    async fn resolve_token(&self, symbol: &str) -> LedgerResult<Address>;

    /// Fetch metadata of a registered token
    async fn token_details(&self, token: Address) -> LedgerResult<TokenDetails>;

    /// Native currency balance of an account, in base units
    async fn native_balance(&self, account: Address) -> LedgerResult<TokenAmount>;

    /// Fee/utility token balance of an account, in base units
    async fn fee_token_balance(&self, account: Address) -> LedgerResult<TokenAmount>;

    /// Balance an account holds of a specific token, in base units
    async fn token_balance(&self, token: Address, account: Address) -> LedgerResult<TokenAmount>;

    /// Query one slot of the token's per-type module list. Past the end of
    /// the list the registry reports a slot with the zero address.
    async fn module_slot(
        &self,
        token: Address,
        module_type: ModuleType,
        index: u64,
    ) -> LedgerResult<ModuleSlot>;

    /// Pause flag of a module instance. Only meaningful for transfer and
    /// offering modules.
    async fn module_paused(&self, handle: &ModuleHandle) -> LedgerResult<bool>;

    /// Whether issuer minting has been permanently ended on the token
    async fn minting_finished(&self, token: Address) -> LedgerResult<bool>;

    /// Current remote clock value (latest block timestamp)
    async fn latest_timestamp(&self) -> LedgerResult<Timestamp>;

    /// Estimate the gas cost of a call with a safety margin applied. Fails
    /// if the call would revert.
    async fn estimate_call(
        &self,
        call: &PreparedCall,
        from: Address,
        margin: f64,
    ) -> LedgerResult<u64>;

    /// Submit a call and block until its confirmation receipt is observed.
    /// There is no timeout and no cancellation once broadcast.
    async fn submit_call(
        &self,
        call: PreparedCall,
        from: Address,
        gas_limit: u64,
        gas_price: u64,
    ) -> LedgerResult<TransactionReceipt>;
}
