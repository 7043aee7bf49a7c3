// Console shell
//
// Menu loop, prompts, and action selection. The shell owns the session,
// collects free-text operands, and re-enumerates after every action so the
// display never trails remote state by more than one pass. Everything it
// shows comes from the core; everything it does goes through the
// dispatcher.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use colored::Colorize;

use tokendesk_core::{
    enumerate_all, Action, ActionRequest, ConsoleError, Dispatcher, ModuleRegistry, Session,
};
use tokendesk_ledger::LedgerClient;
use tokendesk_types::Address;

use crate::display;

/// Default fee price for the demo network, in base units
pub const DEFAULT_GAS_PRICE: u64 = 50_000_000_000;

/// Run the console until the operator exits
pub async fn run(
    ledger: &dyn LedgerClient,
    operator: Address,
    gas_price: u64,
    max_slots: u64,
) -> Result<()> {
    display::banner();
    display::user_info(ledger, operator).await?;

    // Symbol selection repeats until a token the operator issued resolves;
    // the chosen symbol is then fixed for the rest of the session.
    let session = loop {
        let symbol =
            prompt("\nEnter the symbol of the registered security token you issued: ")?;
        match Session::open(ledger, &symbol, operator, gas_price).await {
            Ok(session) => break session.with_max_slots(max_slots),
            Err(err @ (ConsoleError::TokenNotFound(_) | ConsoleError::NotAuthorized { .. })) => {
                println!("{}", format!("\n{err}. Please enter another symbol.").red());
            }
            Err(err) => return Err(err.into()),
        }
    };

    let dispatcher = Dispatcher::new(ledger);
    loop {
        display::user_info(ledger, operator).await?;
        display::token_info(ledger, &session).await?;
        let registry = enumerate_all(ledger, &session).await;
        display::module_info(&registry);

        let action = select_action()?;
        if action == Action::Exit {
            return Ok(());
        }
        let request = match build_request(action, &registry)? {
            Some(request) => request,
            None => continue,
        };
        let outcome = dispatcher.dispatch(&session, &registry, request).await;
        display::outcome(&session, &outcome);
        if !back_to_menu()? {
            return Ok(());
        }
    }
}

fn prompt(message: &str) -> Result<String> {
    print!("{}", message.yellow());
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Addresses are accepted syntactically here; everything beyond the hex
/// shape is the remote contract's concern.
fn prompt_address(message: &str) -> Result<Option<Address>> {
    let input = prompt(message)?;
    match input.parse::<Address>() {
        Ok(address) => Ok(Some(address)),
        Err(err) => {
            println!("{}", format!("\n{err}").red());
            Ok(None)
        }
    }
}

fn select_action() -> Result<Action> {
    loop {
        println!("\n{}", "What do you want to do?".yellow());
        for (index, action) in Action::MENU.iter().enumerate() {
            println!("  [{}] {}", index + 1, action.label());
        }
        let input = prompt("Select an option: ")?;
        match input.parse::<usize>() {
            Ok(choice) if (1..=Action::MENU.len()).contains(&choice) => {
                let action = Action::MENU[choice - 1];
                println!("\nSelected: {}", action.label());
                return Ok(action);
            }
            _ => println!("{}", "Invalid selection.".red()),
        }
    }
}

fn build_request(action: Action, registry: &ModuleRegistry) -> Result<Option<ActionRequest>> {
    let request = match action {
        Action::AddModule => ActionRequest::AddModule,
        Action::PauseModule => ActionRequest::PauseModule,
        Action::ChangeBudget => ActionRequest::ChangeBudget,
        Action::RemoveModule => match select_module(registry)? {
            Some(position) => ActionRequest::RemoveModule { position },
            None => return Ok(None),
        },
        Action::Whitelist => match prompt_address("Enter the address to be whitelisted: ")? {
            Some(investor) => ActionRequest::Whitelist { investor },
            None => return Ok(None),
        },
        Action::Mint => {
            let to = match prompt_address("Enter the address to receive the tokens: ")? {
                Some(to) => to,
                None => return Ok(None),
            };
            let amount = prompt("Enter the amount of tokens to mint: ")?;
            ActionRequest::Mint { to, amount }
        }
        Action::EndMintingIssuer => ActionRequest::EndMintingIssuer,
        Action::EndMintingSto => ActionRequest::EndMintingSto,
        Action::Exit => return Ok(None),
    };
    Ok(Some(request))
}

/// Pick a module from the flattened listing. The chosen position resolves
/// back to (type, slot) inside the dispatcher.
fn select_module(registry: &ModuleRegistry) -> Result<Option<usize>> {
    let flattened = registry.flattened();
    if flattened.is_empty() {
        println!("{}", "\nNo modules are attached.".red());
        return Ok(None);
    }
    println!("\n{}", "Which module would you like to remove?".yellow());
    for (index, record) in flattened.iter().enumerate() {
        println!("  [{}] {}", index + 1, record.name);
    }
    let input = prompt("Select a module (blank to cancel): ")?;
    match input.parse::<usize>() {
        Ok(choice) if (1..=flattened.len()).contains(&choice) => {
            println!("\nSelected: {}", flattened[choice - 1].name);
            Ok(Some(choice - 1))
        }
        _ => Ok(None),
    }
}

fn back_to_menu() -> Result<bool> {
    loop {
        println!("\n{}", "What do you want to do?".yellow());
        println!("  [1] Return to Menu");
        println!("  [2] Exit");
        match prompt("Select an option: ")?.as_str() {
            "1" => return Ok(true),
            "2" => return Ok(false),
            _ => println!("{}", "Invalid selection.".red()),
        }
    }
}
