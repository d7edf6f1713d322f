//! `gatepay token`: fetch a client token for a transaction's checkout.

use clap::Args;
use serde::Deserialize;
use uuid::Uuid;

use super::{decode, unreachable, DEFAULT_ENDPOINT};

#[derive(Args, Debug)]
pub struct TokenArgs {
    /// Transaction id.
    pub transaction_id: Uuid,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

pub async fn run(args: &TokenArgs) -> anyhow::Result<()> {
    let url = format!(
        "{}/api/v1/transactions/{}/client-token",
        args.endpoint, args.transaction_id
    );

    let resp = reqwest::get(&url)
        .await
        .map_err(|e| unreachable(&args.endpoint, e))?;
    let body: TokenResponse = decode(resp, "client token").await?;

    println!("{}", body.token);
    Ok(())
}
