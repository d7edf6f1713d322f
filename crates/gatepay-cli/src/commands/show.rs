//! `gatepay show`: print a transaction.

use clap::Args;
use uuid::Uuid;

use super::{decode, unreachable, TransactionSummary, DEFAULT_ENDPOINT};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Transaction id.
    pub transaction_id: Uuid,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

pub async fn run(args: &ShowArgs) -> anyhow::Result<()> {
    let url = format!("{}/api/v1/transactions/{}", args.endpoint, args.transaction_id);

    let resp = reqwest::get(&url)
        .await
        .map_err(|e| unreachable(&args.endpoint, e))?;
    let tx: TransactionSummary = decode(resp, "show").await?;

    println!("Transaction:");
    tx.print();
    Ok(())
}
