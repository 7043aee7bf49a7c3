// Session context
//
// One explicit value threaded through every core call. The shell owns it;
// core components borrow it read-only. The active symbol is fixed for the
// lifetime of the session.

use tokendesk_ledger::{LedgerClient, LedgerError, TokenDetails};
use tokendesk_types::Address;

use crate::error::{ConsoleError, ConsoleResult};

/// Defensive ceiling on module slots probed per type. The remote registry
/// guarantees a sentinel after the last entry; the cap only bounds latency
/// against a registry that violates that invariant.
pub const DEFAULT_MAX_SLOTS: u64 = 1024;

/// Process-scoped console session: one user, one token
#[derive(Debug, Clone)]
pub struct Session {
    /// Active operator account, also the token's issuer
    pub user: Address,
    /// Metadata of the token under management
    pub token: TokenDetails,
    /// Fee price applied to every submission
    pub gas_price: u64,
    /// Enumeration cap per module type
    pub max_slots: u64,
}

impl Session {
    /// Resolve a symbol and open a session for it. Fails with
    /// `TokenNotFound` for unregistered symbols and `NotAuthorized` when
    /// the active account is not the recorded issuer; both are recoverable
    /// by re-prompting.
    pub async fn open(
        client: &dyn LedgerClient,
        symbol: &str,
        user: Address,
        gas_price: u64,
    ) -> ConsoleResult<Session> {
        let address = match client.resolve_token(symbol).await {
            Ok(address) if !address.is_zero() => address,
            Ok(_) | Err(LedgerError::NotFound(_)) => {
                return Err(ConsoleError::TokenNotFound(symbol.to_string()));
            }
            Err(err) => return Err(err.into()),
        };
        let token = client.token_details(address).await?;
        if token.issuer != user {
            return Err(ConsoleError::NotAuthorized {
                symbol: symbol.to_string(),
            });
        }
        Ok(Session {
            user,
            token,
            gas_price,
            max_slots: DEFAULT_MAX_SLOTS,
        })
    }

    /// Override the per-type enumeration cap
    pub fn with_max_slots(mut self, max_slots: u64) -> Self {
        self.max_slots = max_slots;
        self
    }
}
