//! Subcommands and the node API types they share.

pub mod checkout;
pub mod create;
pub mod init;
pub mod poll;
pub mod show;
pub mod token;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use uuid::Uuid;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:9401";

#[derive(Deserialize)]
struct ErrorResponse {
    detail: String,
}

#[derive(Deserialize)]
pub struct AmountView {
    pub value: u128,
    pub currency: String,
}

#[derive(Deserialize)]
pub struct PaymentMethodSummary {
    pub id: Uuid,
    pub verified: bool,
    pub has_token: bool,
    pub has_nonce: bool,
    pub details: serde_json::Value,
}

#[derive(Deserialize)]
pub struct TransactionSummary {
    pub id: Uuid,
    pub state: String,
    pub amount: AmountView,
    pub processor: String,
    pub external_reference: Option<String>,
    pub gateway_status: Option<String>,
    pub error_codes: Option<Vec<u32>>,
    pub fail_code: Option<String>,
    pub fail_reason: Option<String>,
    pub payment_method: PaymentMethodSummary,
}

impl TransactionSummary {
    pub fn print(&self) {
        println!("  ID:          {}", self.id);
        println!("  State:       {}", self.state);
        println!("  Amount:      {} {}", self.amount.value, self.amount.currency);
        println!("  Processor:   {}", self.processor);
        if let Some(reference) = &self.external_reference {
            println!("  Gateway ID:  {}", reference);
        }
        if let Some(status) = &self.gateway_status {
            println!("  Gateway:     {}", status);
        }
        if let Some(code) = &self.fail_code {
            println!("  Fail code:   {}", code);
        }
        if let Some(reason) = &self.fail_reason {
            println!("  Reason:      {}", reason);
        }
        if let Some(codes) = &self.error_codes {
            println!("  Errors:      {:?}", codes);
        }
        let pm = &self.payment_method;
        println!("  Payment method {}:", pm.id);
        println!(
            "    verified={} token={} nonce={}",
            pm.verified, pm.has_token, pm.has_nonce
        );
        if pm.details.as_object().is_some_and(|d| !d.is_empty()) {
            println!("    details: {}", pm.details);
        }
    }
}

#[derive(Deserialize)]
pub struct ActionResponse {
    pub success: bool,
    pub transaction: TransactionSummary,
}

/// Decode a successful response body, or turn the node's error detail into an error.
pub async fn decode<T: DeserializeOwned>(resp: reqwest::Response, action: &str) -> anyhow::Result<T> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json().await?);
    }
    if let Ok(err) = resp.json::<ErrorResponse>().await {
        anyhow::bail!("{} failed (HTTP {}): {}", action, status, err.detail);
    }
    anyhow::bail!("{} failed (HTTP {})", action, status)
}

pub fn unreachable(endpoint: &str, e: reqwest::Error) -> anyhow::Error {
    anyhow::anyhow!(
        "could not reach node at {}: {}\nIs the node running? Start it with: gatepay-node",
        endpoint,
        e
    )
}
