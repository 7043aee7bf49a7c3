// Purpose: entry point for the tokendesk console binary.

mod demo;
mod display;
mod shell;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line module manager for security tokens
#[derive(Debug, Parser)]
#[command(name = "tokendesk", about = "Operator console for modular security tokens")]
struct Cli {
    /// Fee price applied to every submission, in base units
    #[arg(long, default_value_t = shell::DEFAULT_GAS_PRICE)]
    gas_price: u64,

    /// Ceiling on module slots probed per type
    #[arg(long, default_value_t = tokendesk_core::DEFAULT_MAX_SLOTS)]
    max_slots: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tokendesk=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let (ledger, operator) = demo::seeded_ledger();
    shell::run(&ledger, operator, cli.gas_price, cli.max_slots).await
}
