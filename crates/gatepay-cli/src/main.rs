//! Gatepay CLI: command-line interface for a Gatepay node.
//!
//! Subcommands: init, create, token, checkout, poll, show.

mod commands;

use clap::{Parser, Subcommand};

/// Gatepay: gateway-backed payments for billing platforms.
#[derive(Parser, Debug)]
#[command(name = "gatepay", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Initialize a new node configuration.
    Init(commands::init::InitArgs),
    /// Create a transaction for a customer.
    Create(commands::create::CreateArgs),
    /// Fetch a client token for a transaction's checkout.
    Token(commands::token::TokenArgs),
    /// Post a payment method nonce back for a transaction.
    Checkout(commands::checkout::CheckoutArgs),
    /// Reconcile a pending transaction with the gateway.
    Poll(commands::poll::PollArgs),
    /// Show a transaction.
    Show(commands::show::ShowArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Init(args) => commands::init::run(args),
        Commands::Create(args) => commands::create::run(args).await,
        Commands::Token(args) => commands::token::run(args).await,
        Commands::Checkout(args) => commands::checkout::run(args).await,
        Commands::Poll(args) => commands::poll::run(args).await,
        Commands::Show(args) => commands::show::run(args).await,
    }
}
