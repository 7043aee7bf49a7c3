// Precondition evaluation
//
// Business-rule checks that must pass before any resources are spent on a
// transaction. Each evaluator answers with a specific ineligibility reason,
// never a generic failure.

use tokendesk_ledger::LedgerClient;
use tokendesk_types::ModuleType;

use crate::error::{ConsoleResult, IneligibleReason};
use crate::registry::{ModuleRecord, ModuleRegistry};
use crate::session::Session;

/// Gate for minting. The issuer-finished flag is checked first since it is
/// cheaper and terminal; offering attachment is a fresh slot-0 probe rather
/// than a registry lookup, so the answer reflects current remote state.
/// Remote failures during evaluation abort the action; they are not treated
/// as eligibility.
pub async fn check_mint(client: &dyn LedgerClient, session: &Session) -> ConsoleResult<()> {
    let token = session.token.address;
    if client.minting_finished(token).await? {
        return Err(IneligibleReason::MintingFinished.into());
    }
    let slot = client.module_slot(token, ModuleType::Offering, 0).await?;
    if !slot.is_sentinel() {
        return Err(IneligibleReason::OfferingAttached.into());
    }
    Ok(())
}

/// Whitelist authority: the transfer manager at slot 0. Its absence is the
/// only way the whitelist action can be ineligible.
pub fn transfer_manager(registry: &ModuleRegistry) -> Result<&ModuleRecord, IneligibleReason> {
    registry
        .at(ModuleType::Transfer, 0)
        .ok_or(IneligibleReason::NoTransferManager)
}
