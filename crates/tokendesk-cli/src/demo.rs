// Demo deployment
//
// The console runs against an in-process ledger seeded with a small
// deployment, so the full enumerate-display-dispatch cycle can be driven
// without a live node. The operator account is the issuer of ACME; GLOBEX
// belongs to someone else and exercises the authorization check.

use tracing::info;

use tokendesk_ledger::{MemoryLedger, TokenDetails};
use tokendesk_types::{Address, ModuleType, TokenAmount};

const DECIMALS: u8 = 18;

fn units(whole: u128) -> TokenAmount {
    TokenAmount::from_base_units(whole * 10u128.pow(DECIMALS as u32))
}

/// Build the demo ledger and return it with the operator account
pub fn seeded_ledger() -> (MemoryLedger, Address) {
    let ledger = MemoryLedger::new();
    let operator = Address([0x01; 20]);
    let stranger = Address([0x02; 20]);

    let acme = Address([0xac; 20]);
    ledger.register_token(TokenDetails {
        address: acme,
        symbol: "ACME".to_string(),
        issuer: operator,
        total_supply: units(1_000_000),
        decimals: DECIMALS,
    });
    ledger.attach_module(acme, ModuleType::Permission, "GeneralPermissionManager", false, false);
    ledger.attach_module(acme, ModuleType::Transfer, "GeneralTransferManager", false, false);
    ledger.attach_module(acme, ModuleType::Checkpoint, "ERC20DividendCheckpoint", true, false);

    let globex = Address([0x6b; 20]);
    ledger.register_token(TokenDetails {
        address: globex,
        symbol: "GLOBEX".to_string(),
        issuer: stranger,
        total_supply: units(500_000),
        decimals: DECIMALS,
    });

    ledger.set_native_balance(operator, units(10));
    ledger.set_fee_token_balance(operator, units(100_000));
    ledger.set_token_balance(acme, operator, units(250_000));

    info!(symbol = "ACME", "demo deployment seeded");
    (ledger, operator)
}
