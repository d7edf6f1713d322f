//! `gatepay poll`: reconcile a pending transaction with the gateway.

use clap::Args;
use uuid::Uuid;

use super::{decode, unreachable, ActionResponse, DEFAULT_ENDPOINT};

#[derive(Args, Debug)]
pub struct PollArgs {
    /// Transaction id.
    pub transaction_id: Uuid,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

pub async fn run(args: &PollArgs) -> anyhow::Result<()> {
    let url = format!(
        "{}/api/v1/transactions/{}/status",
        args.endpoint, args.transaction_id
    );

    let client = reqwest::Client::new();
    let resp = client
        .post(&url)
        .send()
        .await
        .map_err(|e| unreachable(&args.endpoint, e))?;
    let action: ActionResponse = decode(resp, "poll").await?;

    if action.success {
        println!("Transaction is in good standing:");
    } else {
        println!("Transaction not updated or unsuccessful:");
    }
    action.transaction.print();
    Ok(())
}
