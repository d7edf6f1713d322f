//! `gatepay create`: create a transaction for a customer.

use clap::Args;
use serde::Serialize;
use uuid::Uuid;

use super::{decode, unreachable, TransactionSummary, DEFAULT_ENDPOINT};

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Amount in minor units (e.g. cents).
    #[arg(short, long)]
    pub amount: u128,

    /// Currency code (e.g. USD).
    #[arg(short, long, default_value = "USD")]
    pub currency: String,

    /// Processor the transaction is charged through.
    #[arg(short, long, default_value = "gateway-triggered")]
    pub processor: String,

    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,

    /// Existing customer id.
    #[arg(long)]
    pub customer_id: Option<Uuid>,

    /// Charge an existing payment method.
    #[arg(long)]
    pub payment_method_id: Option<Uuid>,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Serialize)]
struct CustomerInput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<Uuid>,
    first_name: &'a str,
    last_name: &'a str,
}

#[derive(Serialize)]
struct CreateTransactionRequest<'a> {
    processor: &'a str,
    amount: u128,
    currency: &'a str,
    customer: CustomerInput<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payment_method_id: Option<Uuid>,
}

pub async fn run(args: &CreateArgs) -> anyhow::Result<()> {
    let url = format!("{}/api/v1/transactions", args.endpoint);
    let body = CreateTransactionRequest {
        processor: &args.processor,
        amount: args.amount,
        currency: &args.currency,
        customer: CustomerInput {
            id: args.customer_id,
            first_name: &args.first_name,
            last_name: &args.last_name,
        },
        payment_method_id: args.payment_method_id,
    };

    let client = reqwest::Client::new();
    let resp = client
        .post(&url)
        .json(&body)
        .send()
        .await
        .map_err(|e| unreachable(&args.endpoint, e))?;
    let tx: TransactionSummary = decode(resp, "create").await?;

    println!("Transaction created:");
    tx.print();
    println!();
    println!("Next: gatepay token {}", tx.id);
    Ok(())
}
