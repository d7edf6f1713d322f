//! Fixtures shared by the cross-crate tests.

use std::sync::Arc;

use gatepay_core::{
    Amount, CustomerRecord, PaymentMethodRecord, SaveJournal, Secret, TransactionRecord,
};
use gatepay_gateway::adapters::{SandboxGateway, ScriptedGateway};
use gatepay_gateway::{
    CustomerDetails, GatewayConfig, GatewayStatus, GatewayTransaction, PayPalDetails,
};
use gatepay_processor::{GatewayProcessor, MemoryVaultLinks, ProcessorConfig, ProcessorRegistry};

pub const ONE_TIME: &str = "gateway-triggered";
pub const RECURRING: &str = "gateway-triggered-recurring";

/// A fresh `Initial` transaction whose saves land in the returned journal.
pub fn transaction(processor: &str, value: u128) -> (TransactionRecord, Arc<SaveJournal>) {
    let customer = CustomerRecord::new("Grace", "Hopper");
    let payment_method = PaymentMethodRecord::new(customer.id, processor);
    let mut tx = TransactionRecord::new(Amount::new(value, "USD"), customer, payment_method);
    let journal = Arc::new(SaveJournal::new());
    tx.attach_sink(journal.clone());
    (tx, journal)
}

pub fn with_nonce(mut tx: TransactionRecord, nonce: &str) -> TransactionRecord {
    tx.payment_method.data.nonce = Some(Secret::new(nonce));
    tx
}

pub fn scripted(
    config: ProcessorConfig,
) -> (GatewayProcessor, Arc<ScriptedGateway>, Arc<MemoryVaultLinks>) {
    let gateway = Arc::new(ScriptedGateway::new());
    let links = Arc::new(MemoryVaultLinks::new());
    let processor = GatewayProcessor::new(config, gateway.clone(), links.clone());
    (processor, gateway, links)
}

/// The default one-time and recurring processors over one sandbox gateway.
pub fn sandbox() -> (ProcessorRegistry, Arc<SandboxGateway>, Arc<MemoryVaultLinks>) {
    let gateway = Arc::new(SandboxGateway::new(GatewayConfig::default()));
    let links = Arc::new(MemoryVaultLinks::new());
    let mut registry = ProcessorRegistry::new();
    for config in [
        ProcessorConfig::new(ONE_TIME),
        ProcessorConfig::new(RECURRING).recurring(true),
    ] {
        registry.register(GatewayProcessor::new(config, gateway.clone(), links.clone()));
    }
    (registry, gateway, links)
}

pub fn gateway_transaction(id: &str, status: GatewayStatus) -> GatewayTransaction {
    GatewayTransaction {
        id: id.to_string(),
        status,
        amount: Amount::new(1000, "USD"),
        processor_response_code: None,
        processor_settlement_response_code: None,
        payment_instrument_type: "credit_card".into(),
        paypal_details: None,
        credit_card_details: None,
        customer_details: CustomerDetails {
            id: "cust_vault".into(),
        },
    }
}

pub fn paypal_transaction(
    id: &str,
    status: GatewayStatus,
    email: &str,
    token: Option<&str>,
) -> GatewayTransaction {
    GatewayTransaction {
        payment_instrument_type: "paypal_account".into(),
        paypal_details: Some(PayPalDetails {
            image_url: Some("https://assets.example/paypal.png".into()),
            payer_email: Some(email.into()),
            token: token.map(Secret::new),
        }),
        ..gateway_transaction(id, status)
    }
}
