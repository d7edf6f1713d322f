//! Fixtures shared by the unit tests.

use std::sync::Arc;

use async_trait::async_trait;
use gatepay_core::{
    Amount, CoreError, CustomerRecord, FailureCode, HostCustomer, HostPaymentMethod,
    HostTransaction, PaymentMethodRecord, TransactionData, TransactionEvent, TransactionRecord,
    TransactionState,
};
use gatepay_gateway::adapters::ScriptedGateway;
use gatepay_gateway::{
    CreditCardDetails, CustomerDetails, GatewayStatus, GatewayTransaction, PayPalDetails,
};
use uuid::Uuid;

use crate::config::{ProcessorConfig, RefusalPolicy};
use crate::processor::GatewayProcessor;
use crate::vault::MemoryVaultLinks;
pub use crate::vault::VaultLinks;

pub const PROCESSOR: &str = "gateway-triggered";
pub const GATEWAY_CUSTOMER: &str = "cust_gw";
pub const PAYPAL_IMAGE: &str = "https://assets.example/paypal.png";

pub fn transaction(processor: &str, value: u128) -> TransactionRecord {
    let customer = CustomerRecord::new("Ada", "Lovelace");
    let payment_method = PaymentMethodRecord::new(customer.id, processor);
    TransactionRecord::new(Amount::new(value, "USD"), customer, payment_method)
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
            id: GATEWAY_CUSTOMER.into(),
        },
    }
}

pub fn card_transaction(id: &str, status: GatewayStatus, token: Option<&str>) -> GatewayTransaction {
    GatewayTransaction {
        credit_card_details: Some(CreditCardDetails {
            image_url: Some("https://assets.example/visa.png".into()),
            card_type: Some("Visa".into()),
            last_4: Some("1881".into()),
            token: token.map(Into::into),
        }),
        ..gateway_transaction(id, status)
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
            image_url: Some(PAYPAL_IMAGE.into()),
            payer_email: Some(email.into()),
            token: token.map(Into::into),
        }),
        ..gateway_transaction(id, status)
    }
}

pub fn processor_with_policy(
    recurring: bool,
    policy: RefusalPolicy,
) -> (GatewayProcessor, Arc<ScriptedGateway>, Arc<MemoryVaultLinks>) {
    let gateway = Arc::new(ScriptedGateway::new());
    let links = Arc::new(MemoryVaultLinks::new());
    let config = ProcessorConfig::new(PROCESSOR)
        .recurring(recurring)
        .on_transition_refused(policy);
    let processor = GatewayProcessor::new(config, gateway.clone(), links.clone());
    (processor, gateway, links)
}

pub fn processor_with_scripted(
    recurring: bool,
) -> (GatewayProcessor, Arc<ScriptedGateway>, Arc<MemoryVaultLinks>) {
    processor_with_policy(recurring, RefusalPolicy::default())
}

/// A host whose state machine refuses every settle, cancel and fail.
pub struct RefusingTransaction(pub TransactionRecord);

impl RefusingTransaction {
    fn refuse(&self, event: TransactionEvent) -> Result<(), CoreError> {
        Err(CoreError::TransitionNotAllowed {
            from: self.0.state,
            event,
        })
    }
}

#[async_trait]
impl HostTransaction for RefusingTransaction {
    fn id(&self) -> Uuid {
        self.0.id()
    }

    fn state(&self) -> TransactionState {
        self.0.state()
    }

    fn amount(&self) -> &Amount {
        self.0.amount()
    }

    fn processor(&self) -> &str {
        self.0.processor()
    }

    fn data(&self) -> &TransactionData {
        self.0.data()
    }

    fn data_mut(&mut self) -> &mut TransactionData {
        self.0.data_mut()
    }

    fn external_reference(&self) -> Option<&str> {
        self.0.external_reference()
    }

    fn set_external_reference(&mut self, reference: String) {
        self.0.set_external_reference(reference)
    }

    fn customer(&self) -> &dyn HostCustomer {
        self.0.customer()
    }

    fn payment_method(&self) -> &dyn HostPaymentMethod {
        self.0.payment_method()
    }

    fn payment_method_mut(&mut self) -> &mut dyn HostPaymentMethod {
        self.0.payment_method_mut()
    }

    fn process(&mut self) -> Result<(), CoreError> {
        self.0.process()
    }

    fn settle(&mut self) -> Result<(), CoreError> {
        self.refuse(TransactionEvent::Settle)
    }

    fn cancel(&mut self) -> Result<(), CoreError> {
        self.refuse(TransactionEvent::Cancel)
    }

    fn fail(
        &mut self,
        _fail_code: Option<FailureCode>,
        _fail_reason: Option<String>,
    ) -> Result<(), CoreError> {
        self.refuse(TransactionEvent::Fail)
    }

    async fn save(&mut self) -> Result<(), CoreError> {
        self.0.save().await
    }
}
