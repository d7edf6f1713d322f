use gatepay_core::{Amount, Secret};
use serde::{Deserialize, Serialize};

use crate::status::GatewayStatus;

/// Credential a sale is charged against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleCredential {
    PaymentMethodToken(Secret),
    PaymentMethodNonce(Secret),
}

/// Who the sale is for: an existing vault customer or a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleCustomer {
    Existing { customer_id: String },
    New { first_name: String, last_name: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Billing {
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleOptions {
    pub submit_for_settlement: bool,
    /// Only sent with a nonce.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_in_vault: Option<bool>,
}

/// A sale (charge) request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleRequest {
    pub amount: Amount,
    pub credential: SaleCredential,
    pub billing: Billing,
    pub customer: SaleCustomer,
    pub options: SaleOptions,
}

/// Request for a client-side token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientTokenRequest {
    pub customer_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayPalDetails {
    pub image_url: Option<String>,
    pub payer_email: Option<String>,
    /// Vault token, present when the account was stored.
    pub token: Option<Secret>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditCardDetails {
    pub image_url: Option<String>,
    pub card_type: Option<String>,
    pub last_4: Option<String>,
    /// Vault token, present when the card was stored.
    pub token: Option<Secret>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    /// Gateway (vault) customer id.
    pub id: String,
}

/// A transaction as the gateway reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayTransaction {
    pub id: String,
    pub status: GatewayStatus,
    pub amount: Amount,
    #[serde(default)]
    pub processor_response_code: Option<u32>,
    #[serde(default)]
    pub processor_settlement_response_code: Option<u32>,
    /// e.g. `paypal_account`, `credit_card`.
    pub payment_instrument_type: String,
    #[serde(default)]
    pub paypal_details: Option<PayPalDetails>,
    #[serde(default)]
    pub credit_card_details: Option<CreditCardDetails>,
    pub customer_details: CustomerDetails,
}

/// A validation error attached to a rejected sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub code: u32,
    pub attribute: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardVerification {
    pub status: String,
    pub processor_response_code: Option<u32>,
}

/// Outcome of a sale call that reached the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleResult {
    pub is_success: bool,
    #[serde(default)]
    pub message: Option<String>,
    /// Errors collected from every level of the response.
    #[serde(default)]
    pub errors: Vec<ValidationError>,
    #[serde(default)]
    pub transaction: Option<GatewayTransaction>,
    #[serde(default)]
    pub credit_card_verification: Option<CardVerification>,
}

impl SaleResult {
    pub fn success(transaction: GatewayTransaction) -> Self {
        Self {
            is_success: true,
            message: None,
            errors: Vec::new(),
            transaction: Some(transaction),
            credit_card_verification: None,
        }
    }

    pub fn rejected(message: impl Into<String>, errors: Vec<ValidationError>) -> Self {
        Self {
            is_success: false,
            message: Some(message.into()),
            errors,
            transaction: None,
            credit_card_verification: None,
        }
    }

    /// Flattened error codes, or `None` when the gateway sent none.
    pub fn error_codes(&self) -> Option<Vec<u32>> {
        if self.errors.is_empty() {
            None
        } else {
            Some(self.errors.iter().map(|e| e.code).collect())
        }
    }
}
