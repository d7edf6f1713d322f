//! `gatepay checkout`: post a payment method nonce back for a transaction,
//! as the checkout page would.

use clap::Args;
use uuid::Uuid;

use super::{unreachable, DEFAULT_ENDPOINT};

#[derive(Args, Debug)]
pub struct CheckoutArgs {
    /// Transaction id.
    pub transaction_id: Uuid,

    /// Payment method nonce obtained with the client token.
    #[arg(short, long)]
    pub nonce: String,

    /// Billing postal code.
    #[arg(long)]
    pub postal_code: Option<String>,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

pub async fn run(args: &CheckoutArgs) -> anyhow::Result<()> {
    let url = format!(
        "{}/api/v1/transactions/{}/callback",
        args.endpoint, args.transaction_id
    );

    let mut form = vec![("payment_method_nonce", args.nonce.as_str())];
    if let Some(postal_code) = &args.postal_code {
        form.push(("postal_code", postal_code.as_str()));
    }

    let client = reqwest::Client::new();
    let resp = client
        .post(&url)
        .form(&form)
        .send()
        .await
        .map_err(|e| unreachable(&args.endpoint, e))?;

    let status = resp.status();
    let message = resp.text().await?;
    if !status.is_success() {
        anyhow::bail!("checkout rejected (HTTP {}): {}", status, message);
    }
    println!("{}", message);
    Ok(())
}
