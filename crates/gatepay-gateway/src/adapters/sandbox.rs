use async_trait::async_trait;
use base64::Engine as _;
use dashmap::{DashMap, DashSet};
use gatepay_core::{Amount, Secret};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::status::GatewayStatus;
use crate::traits::Gateway;
use crate::types::{
    ClientTokenRequest, CreditCardDetails, CustomerDetails, GatewayTransaction, PayPalDetails,
    SaleCredential, SaleCustomer, SaleRequest, SaleResult, ValidationError,
};

/// Test nonces understood by the sandbox.
pub mod nonces {
    pub const VALID_CARD: &str = "fake-valid-nonce";
    pub const VALID_VISA: &str = "fake-valid-visa-nonce";
    pub const PAYPAL_ONE_TIME: &str = "fake-paypal-one-time-nonce";
    pub const PAYPAL_FUTURE: &str = "fake-paypal-future-nonce";
    pub const PROCESSOR_DECLINED: &str = "fake-processor-declined-visa-nonce";
    pub const GATEWAY_REJECTED_FRAUD: &str = "fake-gateway-rejected-fraud-nonce";
    pub const CONSUMED: &str = "fake-consumed-nonce";
}

/// Validation error codes returned for malformed sales.
pub mod codes {
    pub const AMOUNT_MUST_BE_POSITIVE: u32 = 81531;
    pub const CUSTOMER_ID_INVALID: u32 = 91510;
    pub const TOKEN_INVALID: u32 = 91518;
    pub const NONCE_UNKNOWN: u32 = 91565;
    pub const NONCE_CONSUMED: u32 = 93107;
}

const SANDBOX_ASSETS: &str = "https://assets.sandbox.gateway.test/payment_method_logo";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Instrument {
    Card,
    PayPal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Approve,
    ProcessorDecline(u32),
    GatewayReject,
}

/// A stored instrument.
#[derive(Debug, Clone)]
struct VaultedInstrument {
    instrument: Instrument,
    customer_id: String,
}

/// In-process gateway for local runs and tests.
///
/// Keeps customers, vaulted instruments and transactions in memory.
/// Amounts between 200000 and 299999 minor units are processor-declined with
/// the major-unit value as the response code (e.g. 200100 → 2001).
pub struct SandboxGateway {
    config: GatewayConfig,
    transactions: DashMap<String, GatewayTransaction>,
    vault: DashMap<String, VaultedInstrument>,
    customers: DashSet<String>,
    consumed_nonces: DashSet<String>,
    outage: Mutex<Option<GatewayError>>,
    token_counter: AtomicU64,
}

impl SandboxGateway {
    pub fn new(config: GatewayConfig) -> Self {
        tracing::info!(
            environment = %config.environment,
            merchant_id = %config.merchant_id,
            "sandbox gateway configured"
        );
        Self {
            config,
            transactions: DashMap::new(),
            vault: DashMap::new(),
            customers: DashSet::new(),
            consumed_nonces: DashSet::new(),
            outage: Mutex::new(None),
            token_counter: AtomicU64::new(0),
        }
    }

    /// Make every call fail with `error` until cleared with `None`.
    pub fn set_outage(&self, error: Option<GatewayError>) {
        let mut outage = self
            .outage
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *outage = error;
    }

    /// Move a stored transaction to `status` (settlement batches, voids).
    pub fn set_status(
        &self,
        transaction_id: &str,
        status: GatewayStatus,
    ) -> Result<(), GatewayError> {
        let mut entry = self
            .transactions
            .get_mut(transaction_id)
            .ok_or_else(|| GatewayError::NotFound(transaction_id.to_string()))?;
        tracing::debug!(transaction_id, from = %entry.status, to = %status, "sandbox status change");
        entry.status = status;
        Ok(())
    }

    /// Drop a stored transaction so `find` reports it missing.
    pub fn forget(&self, transaction_id: &str) {
        self.transactions.remove(transaction_id);
    }

    /// Register a vault customer ahead of time.
    pub fn add_customer(&self, customer_id: impl Into<String>) {
        self.customers.insert(customer_id.into());
    }

    pub fn customer_count(&self) -> usize {
        self.customers.len()
    }

    pub fn vaulted_count(&self) -> usize {
        self.vault.len()
    }

    fn check_outage(&self) -> Result<(), GatewayError> {
        let outage = self
            .outage
            .lock()
            .map_err(|_| GatewayError::Other("sandbox outage lock poisoned".into()))?;
        match outage.as_ref() {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn short_id() -> String {
        let id = Uuid::now_v7().simple().to_string();
        id[id.len() - 8..].to_string()
    }

    fn resolve_nonce(nonce: &str) -> Option<(Instrument, Outcome)> {
        match nonce {
            nonces::VALID_CARD | nonces::VALID_VISA => Some((Instrument::Card, Outcome::Approve)),
            nonces::PAYPAL_ONE_TIME | nonces::PAYPAL_FUTURE => {
                Some((Instrument::PayPal, Outcome::Approve))
            }
            nonces::PROCESSOR_DECLINED => Some((Instrument::Card, Outcome::ProcessorDecline(2000))),
            nonces::GATEWAY_REJECTED_FRAUD => Some((Instrument::Card, Outcome::GatewayReject)),
            _ => None,
        }
    }

    fn amount_outcome(amount: &Amount) -> Outcome {
        if (200_000..300_000).contains(&amount.value) {
            Outcome::ProcessorDecline((amount.value / 100) as u32)
        } else {
            Outcome::Approve
        }
    }

    fn validation_error(code: u32, attribute: &str, message: &str) -> ValidationError {
        ValidationError {
            code,
            attribute: attribute.into(),
            message: message.into(),
        }
    }

    fn reject(code: u32, attribute: &str, message: &str) -> SaleResult {
        SaleResult::rejected(message, vec![Self::validation_error(code, attribute, message)])
    }

    fn authorization_fingerprint(&self, customer_id: Option<&str>, counter: u64) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.config.private_key.expose().as_bytes());
        hasher.update(self.config.merchant_id.as_bytes());
        hasher.update(customer_id.unwrap_or_default().as_bytes());
        hasher.update(&counter.to_be_bytes());
        hex::encode(hasher.finalize().as_bytes())
    }

    fn build_transaction(
        &self,
        request: &SaleRequest,
        instrument: Instrument,
        status: GatewayStatus,
        processor_response_code: Option<u32>,
        customer_id: String,
        token: Option<Secret>,
    ) -> GatewayTransaction {
        let (payment_instrument_type, paypal_details, credit_card_details) = match instrument {
            Instrument::PayPal => (
                "paypal_account".to_string(),
                Some(PayPalDetails {
                    image_url: Some(format!("{SANDBOX_ASSETS}/paypal.png")),
                    payer_email: Some("payer@example.com".into()),
                    token,
                }),
                None,
            ),
            Instrument::Card => (
                "credit_card".to_string(),
                None,
                Some(CreditCardDetails {
                    image_url: Some(format!("{SANDBOX_ASSETS}/visa.png")),
                    card_type: Some("Visa".into()),
                    last_4: Some("1881".into()),
                    token,
                }),
            ),
        };

        GatewayTransaction {
            id: Self::short_id(),
            status,
            amount: request.amount.clone(),
            processor_response_code,
            processor_settlement_response_code: None,
            payment_instrument_type,
            paypal_details,
            credit_card_details,
            customer_details: CustomerDetails { id: customer_id },
        }
    }
}

#[async_trait]
impl Gateway for SandboxGateway {
    async fn find(&self, transaction_id: &str) -> Result<GatewayTransaction, GatewayError> {
        self.check_outage()?;
        self.transactions
            .get(transaction_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| GatewayError::NotFound(transaction_id.to_string()))
    }

    async fn sale(&self, request: SaleRequest) -> Result<SaleResult, GatewayError> {
        self.check_outage()?;

        if request.amount.is_zero() {
            return Ok(Self::reject(
                codes::AMOUNT_MUST_BE_POSITIVE,
                "amount",
                "Amount must be greater than zero.",
            ));
        }

        let customer_id = match &request.customer {
            SaleCustomer::Existing { customer_id } => {
                if !self.customers.contains(customer_id) {
                    return Ok(Self::reject(
                        codes::CUSTOMER_ID_INVALID,
                        "customer_id",
                        "Customer ID is invalid.",
                    ));
                }
                customer_id.clone()
            }
            SaleCustomer::New { .. } => format!("cust_{}", Self::short_id()),
        };

        let (instrument, outcome, mut token) = match &request.credential {
            SaleCredential::PaymentMethodToken(token) => {
                let Some(vaulted) = self.vault.get(token.expose()).map(|v| v.value().clone())
                else {
                    return Ok(Self::reject(
                        codes::TOKEN_INVALID,
                        "payment_method_token",
                        "Payment method token is invalid.",
                    ));
                };
                if vaulted.customer_id != customer_id {
                    tracing::debug!(
                        vault_customer = %vaulted.customer_id,
                        sale_customer = %customer_id,
                        "token charged for a different customer"
                    );
                }
                (vaulted.instrument, Outcome::Approve, Some(token.clone()))
            }
            SaleCredential::PaymentMethodNonce(nonce) => {
                let value = nonce.expose();
                if value == nonces::CONSUMED || self.consumed_nonces.contains(value) {
                    return Ok(Self::reject(
                        codes::NONCE_CONSUMED,
                        "payment_method_nonce",
                        "Cannot use a payment_method_nonce more than once.",
                    ));
                }
                let Some((instrument, outcome)) = Self::resolve_nonce(value) else {
                    return Ok(Self::reject(
                        codes::NONCE_UNKNOWN,
                        "payment_method_nonce",
                        "Unknown or expired payment_method_nonce.",
                    ));
                };
                self.consumed_nonces.insert(value.to_string());
                (instrument, outcome, None)
            }
        };

        let outcome = match outcome {
            Outcome::Approve => Self::amount_outcome(&request.amount),
            other => other,
        };

        let result = match outcome {
            Outcome::Approve => {
                self.customers.insert(customer_id.clone());
                if token.is_none() && request.options.store_in_vault == Some(true) {
                    let issued = format!("tok_{}", Self::short_id());
                    self.vault.insert(
                        issued.clone(),
                        VaultedInstrument {
                            instrument,
                            customer_id: customer_id.clone(),
                        },
                    );
                    token = Some(Secret::new(issued));
                }
                let status = if request.options.submit_for_settlement {
                    GatewayStatus::SubmittedForSettlement
                } else {
                    GatewayStatus::Authorized
                };
                let transaction =
                    self.build_transaction(&request, instrument, status, Some(1000), customer_id, token);
                SaleResult::success(transaction)
            }
            Outcome::ProcessorDecline(code) => {
                let transaction = self.build_transaction(
                    &request,
                    instrument,
                    GatewayStatus::ProcessorDeclined,
                    Some(code),
                    customer_id,
                    None,
                );
                SaleResult {
                    is_success: false,
                    message: Some("Processor declined".into()),
                    errors: Vec::new(),
                    transaction: Some(transaction),
                    credit_card_verification: None,
                }
            }
            Outcome::GatewayReject => {
                let transaction = self.build_transaction(
                    &request,
                    instrument,
                    GatewayStatus::GatewayRejected,
                    None,
                    customer_id,
                    None,
                );
                SaleResult {
                    is_success: false,
                    message: Some("Gateway Rejected: fraud".into()),
                    errors: Vec::new(),
                    transaction: Some(transaction),
                    credit_card_verification: None,
                }
            }
        };

        if let Some(transaction) = &result.transaction {
            self.transactions
                .insert(transaction.id.clone(), transaction.clone());
            tracing::info!(
                transaction_id = %transaction.id,
                status = %transaction.status,
                amount = %transaction.amount,
                "sandbox sale processed"
            );
        }

        Ok(result)
    }

    async fn generate_client_token(
        &self,
        request: ClientTokenRequest,
    ) -> Result<String, GatewayError> {
        self.check_outage()?;

        if let Some(customer_id) = &request.customer_id {
            if !self.customers.contains(customer_id) {
                return Err(GatewayError::InvalidRequest(format!(
                    "customer {customer_id} does not exist"
                )));
            }
        }

        let counter = self.token_counter.fetch_add(1, Ordering::Relaxed);
        let envelope = serde_json::json!({
            "version": 2,
            "environment": self.config.environment.to_string(),
            "merchantId": self.config.merchant_id,
            "authorizationFingerprint":
                self.authorization_fingerprint(request.customer_id.as_deref(), counter),
            "customerId": request.customer_id,
        });

        Ok(base64::engine::general_purpose::STANDARD.encode(envelope.to_string()))
    }

    fn gateway_id(&self) -> &str {
        "gw-sandbox"
    }
}
