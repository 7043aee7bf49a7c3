// Console output formatting
//
// Presentation only: everything here reads the registry and session that
// the core rebuilt and renders them for the terminal.

use colored::Colorize;

use tokendesk_core::{ActionOutcome, Confirmation, ModuleRegistry, Session};
use tokendesk_ledger::LedgerClient;
use tokendesk_types::{Address, ModuleType};

/// Display scaling for the native and fee currencies
const CURRENCY_DECIMALS: u8 = 18;

/// Opening banner
pub fn banner() {
    println!("{}", "******************************************".yellow());
    println!("{}", "Welcome to the Command-Line Module Manager".yellow());
    println!("{}", "******************************************".yellow());
    println!("\nA demo deployment is seeded: the token you issued is ACME.");
}

/// Active account block: address plus native and fee token balances
pub async fn user_info(ledger: &dyn LedgerClient, user: Address) -> anyhow::Result<()> {
    let native = ledger.native_balance(user).await?;
    let fee = ledger.fee_token_balance(user).await?;
    println!(
        "\n    *******************    User Information    ********************\n    \
         - Address:           {}\n    \
         - Fee token balance: {}\n    \
         - Native balance:    {}",
        user,
        fee.to_decimal_string(CURRENCY_DECIMALS),
        native.to_decimal_string(CURRENCY_DECIMALS),
    );
    Ok(())
}

/// Token block: address, symbol, supply, and the operator's own balance
pub async fn token_info(ledger: &dyn LedgerClient, session: &Session) -> anyhow::Result<()> {
    let token = &session.token;
    let balance = ledger.token_balance(token.address, session.user).await?;
    let symbol = token.symbol.to_uppercase();
    println!(
        "\n    **************    Security Token Information    ***************\n    \
         - Address:           {}\n    \
         - Token symbol:      {}\n    \
         - Total supply:      {} {}\n    \
         - User balance:      {} {}",
        token.address,
        symbol,
        token.total_supply.to_decimal_string(token.decimals),
        symbol,
        balance.to_decimal_string(token.decimals),
        symbol,
    );
    Ok(())
}

/// Module block: per-type counts, then per-module status lines
pub fn module_info(registry: &ModuleRegistry) {
    println!("\n    ******************    Module Information    *******************");
    for ty in ModuleType::ALL {
        let count = registry.count_of(ty);
        let shown = if count > 0 {
            count.to_string()
        } else {
            "None".to_string()
        };
        println!("    - {:<22}{}", format!("{}:", ty.label()), shown);
    }

    for ty in ModuleType::ALL {
        let records = registry.of_type(ty);
        if records.is_empty() {
            continue;
        }
        println!("\n    {}", format!("{} Modules:", ty.label()).green());
        for record in records {
            let locked = if record.locked { "Locked" } else { "Unlocked" };
            if ty.is_pausable() {
                let paused = if record.paused { "Paused" } else { "Unpaused" };
                println!(
                    "    - {} is {} and {} at {}",
                    record.name, locked, paused, record.address
                );
            } else {
                println!("    - {} is {} at {}", record.name, locked, record.address);
            }
        }
    }
}

/// Render the outcome of a dispatched action
pub fn outcome(session: &Session, outcome: &ActionOutcome) {
    match outcome {
        ActionOutcome::Confirmed(Confirmation::Whitelisted { investor, until }) => {
            let until = chrono::DateTime::<chrono::Utc>::from_timestamp(until.as_u64() as i64, 0)
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| until.to_string());
            let message =
                format!("\nWhitelisting successful for {investor} (valid until {until}).");
            println!("{}", message.green());
        }
        ActionOutcome::Confirmed(Confirmation::Minted { to, amount }) => {
            let message = format!(
                "\nMinting successful: {} {} to {}.",
                amount.to_decimal_string(session.token.decimals),
                session.token.symbol.to_uppercase(),
                to,
            );
            println!("{}", message.green());
        }
        ActionOutcome::Confirmed(confirmation) => {
            println!("{}", format!("\n{confirmation}").green());
        }
        ActionOutcome::Ineligible(reason) => {
            println!("{}", format!("\nAction is not possible - {reason}").red());
        }
        ActionOutcome::Failed(err) => {
            println!("{}", format!("\n{err}").red());
        }
        ActionOutcome::NotAvailable => {
            let notice = "\n    *********************************\n    \
                 This option is not yet available.\n    \
                 *********************************";
            println!("{}", notice.red());
        }
    }
}
