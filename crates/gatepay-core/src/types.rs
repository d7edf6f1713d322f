use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Value in minor units (cents, centavos, ...) with an ISO 4217 currency code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    /// Value in the smallest unit of the currency.
    pub value: u128,
    /// ISO 4217 currency code.
    pub currency: String,
}

impl Amount {
    /// Create a new amount.
    pub fn new(value: u128, currency: impl Into<String>) -> Self {
        Self {
            value,
            currency: currency.into(),
        }
    }

    /// Check if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.value == 0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.currency)
    }
}

/// Opaque credential material (payment method tokens and nonces).
///
/// Never printed by `Debug`; the buffer is zeroized on drop. Encryption at
/// rest is the host's job, so the value serializes as a plain string.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the raw value. Only the gateway boundary should need this.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Payment instrument kinds the processor knows how to describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstrumentType {
    #[serde(rename = "paypal_account")]
    PayPal,
    #[serde(rename = "credit_card")]
    CreditCard,
}

impl InstrumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PayPal => "paypal_account",
            Self::CreditCard => "credit_card",
        }
    }

    /// Parse the gateway's `payment_instrument_type` value.
    pub fn from_gateway(value: &str) -> Option<Self> {
        match value {
            "paypal_account" => Some(Self::PayPal),
            "credit_card" => Some(Self::CreditCard),
            _ => None,
        }
    }
}

impl fmt::Display for InstrumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Public description of a payment instrument, safe to show to end users.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentDetails {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub instrument_type: Option<InstrumentType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// PayPal account email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Last four digits of the card number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_4: Option<String>,
    /// Card brand, e.g. "Visa".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_type: Option<String>,
    /// Billing postal code captured at checkout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
}

impl InstrumentDetails {
    /// Overlay every field that is set in `update`, keeping the rest.
    pub fn merge(&mut self, update: InstrumentDetails) {
        if update.instrument_type.is_some() {
            self.instrument_type = update.instrument_type;
        }
        if update.image_url.is_some() {
            self.image_url = update.image_url;
        }
        if update.email.is_some() {
            self.email = update.email;
        }
        if update.last_4.is_some() {
            self.last_4 = update.last_4;
        }
        if update.card_type.is_some() {
            self.card_type = update.card_type;
        }
        if update.postal_code.is_some() {
            self.postal_code = update.postal_code;
        }
    }
}

/// Gateway payload stored on a host payment method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethodData {
    /// Reusable vault token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<Secret>,
    /// Single-use nonce; cleared once a token is captured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<Secret>,
    /// Last gateway transaction id charged against this method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_reference_id: Option<String>,
    /// Last gateway status seen for this method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub details: InstrumentDetails,
}

impl PaymentMethodData {
    /// Store a reusable token and drop the nonce it replaces.
    pub fn capture_token(&mut self, token: Secret) {
        self.token = Some(token);
        self.nonce = None;
    }

    /// Whether the method carries anything the gateway can charge.
    pub fn has_credential(&self) -> bool {
        self.token.is_some() || self.nonce.is_some()
    }
}

/// Semi-structured data blob stored on a host transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionData {
    /// Last gateway status string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Gateway validation error codes from a rejected sale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_codes: Option<Vec<u32>>,
    /// Keys owned by other host components.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Host-level failure reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCode {
    InsufficientFunds,
    ExpiredPaymentMethod,
    ExpiredCard,
    InvalidPaymentMethod,
    InvalidCard,
    LimitExceeded,
    TransactionDeclinedByBank,
    TransactionHardDeclined,
    TransactionHardDeclinedByBank,
    Default,
}

impl FailureCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InsufficientFunds => "insufficient_funds",
            Self::ExpiredPaymentMethod => "expired_payment_method",
            Self::ExpiredCard => "expired_card",
            Self::InvalidPaymentMethod => "invalid_payment_method",
            Self::InvalidCard => "invalid_card",
            Self::LimitExceeded => "limit_exceeded",
            Self::TransactionDeclinedByBank => "transaction_declined_by_bank",
            Self::TransactionHardDeclined => "transaction_hard_declined",
            Self::TransactionHardDeclinedByBank => "transaction_hard_declined_by_bank",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for FailureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
