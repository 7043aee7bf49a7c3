// In-memory ledger backend
//
// Implements `LedgerClient` over process-local state. It plays two roles:
// the scripted backend for tests (probe logs, failure injection) and the
// backend behind the demo console, where no live node is assumed.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use tokendesk_types::{
    Address, BlockHeight, Bytes32, ModuleType, Timestamp, TokenAmount, TransactionId,
};

use crate::client::{
    LedgerClient, ModuleHandle, ModuleSlot, PreparedCall, TokenDetails, TransactionReceipt,
    TransactionStatus,
};
use crate::error::{LedgerError, LedgerResult};

/// Seconds the simulated clock advances per produced block
const BLOCK_INTERVAL_SECS: u64 = 13;

/// Record of one `submit_call` invocation, successful or not
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedCall {
    /// The call as submitted
    pub call: PreparedCall,
    /// Submitting account
    pub from: Address,
    /// Gas ceiling the caller supplied
    pub gas_limit: u64,
    /// Fee price the caller supplied
    pub gas_price: u64,
}

#[derive(Debug, Clone)]
struct ModuleEntry {
    slot: ModuleSlot,
    paused: bool,
}

#[derive(Debug, Clone, Copy)]
struct WhitelistWindow {
    expiry: Timestamp,
}

#[derive(Debug, Clone)]
struct TokenState {
    details: TokenDetails,
    minting_finished: bool,
    modules: HashMap<ModuleType, Vec<ModuleEntry>>,
    balances: HashMap<Address, TokenAmount>,
    whitelist: HashMap<Address, WhitelistWindow>,
}

#[derive(Debug, Default)]
struct Inner {
    tokens: HashMap<Address, TokenState>,
    symbols: HashMap<String, Address>,
    native_balances: HashMap<Address, TokenAmount>,
    fee_balances: HashMap<Address, TokenAmount>,
    clock: u64,
    height: u64,
    next_module: u64,
    next_tx: u64,
    probes: Vec<(ModuleType, u64)>,
    failing_slots: HashSet<(Address, ModuleType, u64)>,
    fail_estimates: Option<String>,
    fail_next_submit: Option<String>,
    submissions: Vec<SubmittedCall>,
}

/// In-memory `LedgerClient` backend
#[derive(Debug)]
pub struct MemoryLedger {
    inner: Mutex<Inner>,
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLedger {
    /// Create an empty ledger with the clock at an arbitrary genesis value
    pub fn new() -> Self {
        Self::with_clock(Timestamp(1_700_000_000))
    }

    /// Create an empty ledger with a chosen clock value
    pub fn with_clock(clock: Timestamp) -> Self {
        let inner = Inner {
            clock: clock.as_u64(),
            height: 1,
            ..Inner::default()
        };
        Self {
            inner: Mutex::new(inner),
        }
    }

    // A poisoned lock only means a prior panic mid-update; the remaining
    // state is still readable, so recover instead of propagating.
    fn state(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a token so its symbol resolves
    pub fn register_token(&self, details: TokenDetails) {
        let mut state = self.state();
        state.symbols.insert(details.symbol.clone(), details.address);
        state.tokens.insert(
            details.address,
            TokenState {
                details,
                minting_finished: false,
                modules: HashMap::new(),
                balances: HashMap::new(),
                whitelist: HashMap::new(),
            },
        );
    }

    /// Attach a module to the next free slot of the given type. Returns the
    /// address allocated for the module instance.
    pub fn attach_module(
        &self,
        token: Address,
        module_type: ModuleType,
        name: &str,
        locked: bool,
        paused: bool,
    ) -> Address {
        let mut state = self.state();
        state.next_module += 1;
        let mut bytes = [0u8; 20];
        bytes[..8].copy_from_slice(&state.next_module.to_be_bytes());
        bytes[19] = 0xed;
        let address = Address(bytes);
        let entry = ModuleEntry {
            slot: ModuleSlot {
                raw_name: Bytes32::from_utf8_padded(name),
                address,
                locked,
            },
            paused,
        };
        if let Some(token_state) = state.tokens.get_mut(&token) {
            token_state
                .modules
                .entry(module_type)
                .or_default()
                .push(entry);
        }
        address
    }

    /// Set the issuer-minting-finished flag
    pub fn set_minting_finished(&self, token: Address, finished: bool) {
        if let Some(token_state) = self.state().tokens.get_mut(&token) {
            token_state.minting_finished = finished;
        }
    }

    /// Set an account's native currency balance
    pub fn set_native_balance(&self, account: Address, amount: TokenAmount) {
        self.state().native_balances.insert(account, amount);
    }

    /// Set an account's fee token balance
    pub fn set_fee_token_balance(&self, account: Address, amount: TokenAmount) {
        self.state().fee_balances.insert(account, amount);
    }

    /// Set an account's balance of a token
    pub fn set_token_balance(&self, token: Address, account: Address, amount: TokenAmount) {
        if let Some(token_state) = self.state().tokens.get_mut(&token) {
            token_state.balances.insert(account, amount);
        }
    }

    /// Whitelist an account directly, bypassing the transfer manager call
    pub fn seed_whitelist(&self, token: Address, investor: Address, expiry: Timestamp) {
        if let Some(token_state) = self.state().tokens.get_mut(&token) {
            token_state
                .whitelist
                .insert(investor, WhitelistWindow { expiry });
        }
    }

    /// Inject a transport failure for one module slot query
    pub fn fail_slot(&self, token: Address, module_type: ModuleType, index: u64) {
        self.state().failing_slots.insert((token, module_type, index));
    }

    /// Make every subsequent estimate fail with the given message
    pub fn fail_estimates(&self, message: impl Into<String>) {
        self.state().fail_estimates = Some(message.into());
    }

    /// Make the next submission fail with a transport error
    pub fn fail_next_submit(&self, message: impl Into<String>) {
        self.state().fail_next_submit = Some(message.into());
    }

    /// Move the clock forward
    pub fn advance_clock(&self, secs: u64) {
        self.state().clock += secs;
    }

    /// Every `submit_call` observed so far, in order
    pub fn submitted(&self) -> Vec<SubmittedCall> {
        self.state().submissions.clone()
    }

    /// Every module slot probed so far, in order
    pub fn probed_slots(&self) -> Vec<(ModuleType, u64)> {
        self.state().probes.clone()
    }

    fn base_gas(call: &PreparedCall) -> u64 {
        match call {
            PreparedCall::RemoveModule { .. } => 120_000,
            PreparedCall::ModifyWhitelist { .. } => 90_000,
            PreparedCall::Mint { .. } => 75_000,
            PreparedCall::FinishMintingIssuer { .. } => 45_000,
            PreparedCall::FinishMintingSto { .. } => 45_000,
        }
    }

    /// Re-execute the call against current state, mirroring what a node
    /// does for an estimate. Returns the revert message, if any.
    fn would_revert(state: &Inner, call: &PreparedCall) -> Option<String> {
        match call {
            PreparedCall::RemoveModule {
                token,
                module_type,
                slot,
            } => {
                let token_state = match state.tokens.get(token) {
                    Some(t) => t,
                    None => return Some("unknown token".to_string()),
                };
                let attached = token_state
                    .modules
                    .get(module_type)
                    .map(|entries| (*slot as usize) < entries.len())
                    .unwrap_or(false);
                if attached {
                    None
                } else {
                    Some("module not found".to_string())
                }
            }
            PreparedCall::ModifyWhitelist { manager, .. } => {
                let known = state.tokens.values().any(|t| {
                    t.modules.values().any(|entries| {
                        entries.iter().any(|e| e.slot.address == *manager)
                    })
                });
                if known {
                    None
                } else {
                    Some("unknown module".to_string())
                }
            }
            PreparedCall::Mint { token, to, .. } => {
                let token_state = match state.tokens.get(token) {
                    Some(t) => t,
                    None => return Some("unknown token".to_string()),
                };
                if token_state.minting_finished {
                    return Some("minting finished".to_string());
                }
                let whitelisted = token_state
                    .whitelist
                    .get(to)
                    .map(|w| w.expiry.as_u64() > state.clock)
                    .unwrap_or(false);
                if whitelisted {
                    None
                } else {
                    Some("beneficiary is not whitelisted".to_string())
                }
            }
            PreparedCall::FinishMintingIssuer { token }
            | PreparedCall::FinishMintingSto { token } => {
                if state.tokens.contains_key(token) {
                    None
                } else {
                    Some("unknown token".to_string())
                }
            }
        }
    }

    fn apply(state: &mut Inner, call: &PreparedCall) {
        match call {
            PreparedCall::RemoveModule {
                token,
                module_type,
                slot,
            } => {
                if let Some(token_state) = state.tokens.get_mut(token) {
                    if let Some(entries) = token_state.modules.get_mut(module_type) {
                        entries.remove(*slot as usize);
                    }
                }
            }
            PreparedCall::ModifyWhitelist {
                manager,
                investor,
                expiry,
                ..
            } => {
                if let Some(token_state) = state
                    .tokens
                    .values_mut()
                    .find(|t| {
                        t.modules.values().any(|entries| {
                            entries.iter().any(|e| e.slot.address == *manager)
                        })
                    })
                {
                    token_state
                        .whitelist
                        .insert(*investor, WhitelistWindow { expiry: *expiry });
                }
            }
            PreparedCall::Mint { token, to, amount } => {
                if let Some(token_state) = state.tokens.get_mut(token) {
                    let balance = token_state.balances.entry(*to).or_insert(TokenAmount::ZERO);
                    *balance = TokenAmount(balance.0.saturating_add(amount.0));
                    token_state.details.total_supply =
                        TokenAmount(token_state.details.total_supply.0.saturating_add(amount.0));
                }
            }
            PreparedCall::FinishMintingIssuer { token }
            | PreparedCall::FinishMintingSto { token } => {
                if let Some(token_state) = state.tokens.get_mut(token) {
                    token_state.minting_finished = true;
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl LedgerClient for MemoryLedger {
    async fn resolve_token(&self, symbol: &str) -> LedgerResult<Address> {
        let state = self.state();
        state
            .symbols
            .get(symbol)
            .copied()
            .ok_or_else(|| LedgerError::not_found(format!("token symbol {symbol}")))
    }

    async fn token_details(&self, token: Address) -> LedgerResult<TokenDetails> {
        let state = self.state();
        state
            .tokens
            .get(&token)
            .map(|t| t.details.clone())
            .ok_or_else(|| LedgerError::not_found(format!("token {token}")))
    }

    async fn native_balance(&self, account: Address) -> LedgerResult<TokenAmount> {
        Ok(self
            .state()
            .native_balances
            .get(&account)
            .copied()
            .unwrap_or(TokenAmount::ZERO))
    }

    async fn fee_token_balance(&self, account: Address) -> LedgerResult<TokenAmount> {
        Ok(self
            .state()
            .fee_balances
            .get(&account)
            .copied()
            .unwrap_or(TokenAmount::ZERO))
    }

    async fn token_balance(&self, token: Address, account: Address) -> LedgerResult<TokenAmount> {
        let state = self.state();
        let token_state = state
            .tokens
            .get(&token)
            .ok_or_else(|| LedgerError::not_found(format!("token {token}")))?;
        Ok(token_state
            .balances
            .get(&account)
            .copied()
            .unwrap_or(TokenAmount::ZERO))
    }

    async fn module_slot(
        &self,
        token: Address,
        module_type: ModuleType,
        index: u64,
    ) -> LedgerResult<ModuleSlot> {
        let mut state = self.state();
        state.probes.push((module_type, index));
        if state.failing_slots.contains(&(token, module_type, index)) {
            return Err(LedgerError::transport("connection reset during slot query"));
        }
        let token_state = state
            .tokens
            .get(&token)
            .ok_or_else(|| LedgerError::not_found(format!("token {token}")))?;
        let slot = token_state
            .modules
            .get(&module_type)
            .and_then(|entries| entries.get(index as usize))
            .map(|entry| entry.slot)
            .unwrap_or(ModuleSlot::EMPTY);
        Ok(slot)
    }

    async fn module_paused(&self, handle: &ModuleHandle) -> LedgerResult<bool> {
        let state = self.state();
        for token_state in state.tokens.values() {
            if let Some(entries) = token_state.modules.get(&handle.module_type()) {
                if let Some(entry) =
                    entries.iter().find(|e| e.slot.address == handle.address())
                {
                    return Ok(entry.paused);
                }
            }
        }
        Err(LedgerError::not_found(format!(
            "module {}",
            handle.address()
        )))
    }

    async fn minting_finished(&self, token: Address) -> LedgerResult<bool> {
        let state = self.state();
        state
            .tokens
            .get(&token)
            .map(|t| t.minting_finished)
            .ok_or_else(|| LedgerError::not_found(format!("token {token}")))
    }

    async fn latest_timestamp(&self) -> LedgerResult<Timestamp> {
        Ok(Timestamp(self.state().clock))
    }

    async fn estimate_call(
        &self,
        call: &PreparedCall,
        _from: Address,
        margin: f64,
    ) -> LedgerResult<u64> {
        let state = self.state();
        if let Some(message) = &state.fail_estimates {
            return Err(LedgerError::reverted(message.clone()));
        }
        if let Some(message) = Self::would_revert(&state, call) {
            return Err(LedgerError::reverted(message));
        }
        Ok((Self::base_gas(call) as f64 * margin).ceil() as u64)
    }

    async fn submit_call(
        &self,
        call: PreparedCall,
        from: Address,
        gas_limit: u64,
        gas_price: u64,
    ) -> LedgerResult<TransactionReceipt> {
        let mut state = self.state();
        state.submissions.push(SubmittedCall {
            call: call.clone(),
            from,
            gas_limit,
            gas_price,
        });
        if let Some(message) = state.fail_next_submit.take() {
            return Err(LedgerError::transport(message));
        }
        let status = match Self::would_revert(&state, &call) {
            Some(message) => TransactionStatus::Failure(message),
            None => {
                Self::apply(&mut state, &call);
                TransactionStatus::Success
            }
        };
        state.height += 1;
        state.clock += BLOCK_INTERVAL_SECS;
        state.next_tx += 1;
        let receipt = TransactionReceipt {
            transaction_id: TransactionId::new(format!("0x{:064x}", state.next_tx)),
            block_height: BlockHeight(state.height),
            status,
            gas_used: Some(Self::base_gas(&call).min(gas_limit)),
        };
        debug!(call = %call, height = state.height, "transaction included");
        Ok(receipt)
    }
}
