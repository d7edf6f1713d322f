//! Integration test: charging transactions end to end.
//!
//! Drives gatepay-processor against a scripted gateway (exact responses)
//! and the in-process sandbox (realistic flows), persisting through the
//! gatepay-core records.

use base64::Engine as _;
use gatepay_core::{
    FailureCode, HostTransaction, InstrumentType, SavedRecord, Secret, TransactionRecord,
    TransactionState,
};
use gatepay_gateway::adapters::sandbox::nonces;
use gatepay_gateway::{
    GatewayStatus, SaleCredential, SaleCustomer, SaleResult, ValidationError,
};
use gatepay_integration_tests::*;
use gatepay_processor::{CallbackFields, CallbackOutcome, ProcessorConfig, VaultLinks};

// =========================================================================
// Scripted gateway
// =========================================================================

#[tokio::test]
async fn test_recurring_paypal_charge_captures_token() {
    let (processor, gateway, links) = scripted(ProcessorConfig::new(RECURRING).recurring(true));
    gateway.push_sale(Ok(SaleResult::success(paypal_transaction(
        "gw1",
        GatewayStatus::SubmittedForSettlement,
        "payer@example.com",
        Some("tok1"),
    ))));

    let (tx, journal) = transaction(RECURRING, 1000);
    let mut tx = with_nonce(tx, "nonce-1");
    let customer_id = tx.customer.id;

    assert!(processor.execute_transaction(&mut tx).await.unwrap());

    assert_eq!(tx.state, TransactionState::Pending);
    assert_eq!(tx.external_reference.as_deref(), Some("gw1"));
    assert_eq!(tx.data.status.as_deref(), Some("submitted_for_settlement"));

    let pm = &tx.payment_method;
    assert!(pm.verified);
    assert_eq!(pm.data.token, Some(Secret::new("tok1")));
    assert_eq!(pm.data.nonce, None);
    assert_eq!(pm.data.gateway_reference_id.as_deref(), Some("gw1"));
    assert_eq!(pm.data.details.instrument_type, Some(InstrumentType::PayPal));
    assert_eq!(pm.data.details.email.as_deref(), Some("payer@example.com"));
    assert_eq!(
        pm.data.details.image_url.as_deref(),
        Some("https://assets.example/paypal.png")
    );

    assert_eq!(
        links.vault_id(customer_id).await.unwrap().as_deref(),
        Some("cust_vault")
    );

    let sale = &gateway.sale_requests()[0];
    assert_eq!(
        sale.credential,
        SaleCredential::PaymentMethodNonce(Secret::new("nonce-1"))
    );
    assert_eq!(sale.options.store_in_vault, Some(true));
    assert!(sale.options.submit_for_settlement);
    assert!(matches!(sale.customer, SaleCustomer::New { .. }));

    let entries = journal.entries();
    assert!(entries.contains(&SavedRecord::PaymentMethod {
        id: pm.id,
        verified: true,
    }));
    assert_eq!(
        entries.last(),
        Some(&SavedRecord::Transaction {
            id: tx.id,
            state: TransactionState::Pending,
        })
    );
}

#[tokio::test]
async fn test_second_charge_reuses_token_and_vault_customer() {
    let (processor, gateway, links) = scripted(ProcessorConfig::new(RECURRING).recurring(true));
    gateway
        .push_sale(Ok(SaleResult::success(paypal_transaction(
            "gw1",
            GatewayStatus::SubmittedForSettlement,
            "payer@example.com",
            Some("tok1"),
        ))))
        .push_sale(Ok(SaleResult::success(paypal_transaction(
            "gw2",
            GatewayStatus::SubmittedForSettlement,
            "payer@example.com",
            Some("tok1"),
        ))));

    let (tx, _journal) = transaction(RECURRING, 1000);
    let mut first = with_nonce(tx, "nonce-1");
    assert!(processor.execute_transaction(&mut first).await.unwrap());

    let mut second = TransactionRecord::new(
        first.amount.clone(),
        first.customer.clone(),
        first.payment_method.clone(),
    );
    assert!(processor.execute_transaction(&mut second).await.unwrap());

    let sale = &gateway.sale_requests()[1];
    assert_eq!(
        sale.credential,
        SaleCredential::PaymentMethodToken(Secret::new("tok1"))
    );
    assert_eq!(sale.options.store_in_vault, None);
    assert_eq!(
        sale.customer,
        SaleCustomer::Existing {
            customer_id: "cust_vault".into()
        }
    );
    assert_eq!(links.len(), 1);
    assert_eq!(second.external_reference.as_deref(), Some("gw2"));
}

#[tokio::test]
async fn test_rejected_sale_fails_with_error_codes() {
    let (processor, gateway, links) = scripted(ProcessorConfig::new(ONE_TIME));
    let errors = [2001, 2042]
        .into_iter()
        .map(|code| ValidationError {
            code,
            attribute: "base".into(),
            message: "declined".into(),
        })
        .collect();
    gateway.push_sale(Ok(SaleResult::rejected("Declined", errors)));

    let (tx, journal) = transaction(ONE_TIME, 1000);
    let mut tx = with_nonce(tx, "nonce-1");

    assert!(!processor.execute_transaction(&mut tx).await.unwrap());

    assert_eq!(tx.state, TransactionState::Failed);
    assert_eq!(tx.fail_code, Some(FailureCode::Default));
    assert_eq!(tx.fail_reason.as_deref(), Some("2001, 2042"));
    assert_eq!(tx.data.error_codes, Some(vec![2001, 2042]));
    assert_eq!(tx.external_reference, None);
    assert!(links.is_empty());
    assert!(!tx.payment_method.verified);
    assert_eq!(tx.payment_method.data.gateway_reference_id, None);
    assert_eq!(tx.payment_method.data.details.instrument_type, None);
    assert_eq!(
        journal.entries().last(),
        Some(&SavedRecord::Transaction {
            id: tx.id,
            state: TransactionState::Failed,
        })
    );
}

#[tokio::test]
async fn test_one_time_processor_never_stores_token() {
    let (processor, gateway, _links) = scripted(ProcessorConfig::new(ONE_TIME));
    gateway.push_sale(Ok(SaleResult::success(paypal_transaction(
        "gw1",
        GatewayStatus::Settling,
        "payer@example.com",
        Some("tok1"),
    ))));

    let (tx, _journal) = transaction(ONE_TIME, 1000);
    let mut tx = with_nonce(tx, "nonce-1");

    assert!(processor.execute_transaction(&mut tx).await.unwrap());
    assert_eq!(tx.state, TransactionState::Settled);
    assert_eq!(tx.payment_method.data.token, None);
    assert!(!tx.payment_method.verified);
    assert_eq!(gateway.sale_requests()[0].options.store_in_vault, Some(false));
}

// =========================================================================
// Sandbox gateway
// =========================================================================

#[tokio::test]
async fn test_sandbox_charge_then_settlement() {
    let (registry, gateway, _links) = sandbox();
    let (tx, _journal) = transaction(ONE_TIME, 1000);
    let mut tx = with_nonce(tx, nonces::VALID_VISA);

    assert!(registry.execute_transaction(&mut tx).await.unwrap());
    assert_eq!(tx.state, TransactionState::Pending);
    assert_eq!(tx.data.status.as_deref(), Some("submitted_for_settlement"));
    assert_eq!(
        tx.payment_method.data.details.instrument_type,
        Some(InstrumentType::CreditCard)
    );
    assert_eq!(tx.payment_method.data.details.last_4.as_deref(), Some("1881"));

    let reference = tx.external_reference.clone().unwrap();
    gateway.set_status(&reference, GatewayStatus::Settled).unwrap();

    assert!(registry.fetch_transaction_status(&mut tx).await.unwrap());
    assert_eq!(tx.state, TransactionState::Settled);
    assert_eq!(tx.data.status.as_deref(), Some("settled"));
}

#[tokio::test]
async fn test_sandbox_processor_decline_maps_failure_code() {
    let (registry, _gateway, _links) = sandbox();
    // 200100 minor units decline with response code 2001.
    let (tx, _journal) = transaction(ONE_TIME, 200_100);
    let mut tx = with_nonce(tx, nonces::VALID_CARD);

    assert!(!registry.execute_transaction(&mut tx).await.unwrap());
    assert_eq!(tx.state, TransactionState::Failed);
    assert_eq!(tx.fail_code, Some(FailureCode::InsufficientFunds));
    assert_eq!(tx.fail_reason.as_deref(), Some("Processor declined"));
}

#[tokio::test]
async fn test_sandbox_consumed_nonce_is_rejected() {
    let (registry, _gateway, _links) = sandbox();
    let (tx, _journal) = transaction(ONE_TIME, 1000);
    let mut tx = with_nonce(tx, nonces::CONSUMED);

    assert!(!registry.execute_transaction(&mut tx).await.unwrap());
    assert_eq!(tx.state, TransactionState::Failed);
    assert_eq!(tx.data.error_codes, Some(vec![93107]));
}

#[tokio::test]
async fn test_sandbox_checkout_callback_then_token_reuse() {
    let (registry, gateway, links) = sandbox();
    let (mut first, _journal) = transaction(RECURRING, 1000);

    let fields = CallbackFields {
        payment_method_nonce: Some(Secret::new(nonces::PAYPAL_FUTURE)),
        postal_code: Some("94107".into()),
    };
    let outcome = registry
        .handle_transaction_response(&mut first, fields)
        .await
        .unwrap();

    assert_eq!(outcome, CallbackOutcome::Charged);
    assert_eq!(first.state, TransactionState::Pending);
    let data = &first.payment_method.data;
    assert_eq!(data.details.postal_code.as_deref(), Some("94107"));
    assert_eq!(data.details.instrument_type, Some(InstrumentType::PayPal));
    assert!(data.token.is_some());
    assert!(first.payment_method.verified);
    assert_eq!(gateway.vaulted_count(), 1);

    let mut second = TransactionRecord::new(
        first.amount.clone(),
        first.customer.clone(),
        first.payment_method.clone(),
    );
    assert!(registry.execute_transaction(&mut second).await.unwrap());
    assert_eq!(second.state, TransactionState::Pending);
    assert_eq!(links.len(), 1);
    assert_eq!(gateway.vaulted_count(), 1);
}

#[tokio::test]
async fn test_sandbox_callback_without_nonce_fails_transaction() {
    let (registry, gateway, _links) = sandbox();
    let (mut tx, _journal) = transaction(ONE_TIME, 1000);

    let outcome = registry
        .handle_transaction_response(&mut tx, CallbackFields::default())
        .await
        .unwrap();

    assert_eq!(outcome, CallbackOutcome::MissingNonce);
    assert_eq!(tx.state(), TransactionState::Failed);
    assert_eq!(
        tx.fail_reason.as_deref(),
        Some("payment_method_nonce was not provided.")
    );
    assert_eq!(gateway.customer_count(), 0);
}

#[tokio::test]
async fn test_sandbox_client_token_scoped_after_first_charge() {
    let (registry, _gateway, links) = sandbox();
    let processor = registry.get(RECURRING).unwrap();
    let (tx, _journal) = transaction(RECURRING, 1000);
    let mut tx = with_nonce(tx, nonces::VALID_CARD);

    let before = processor.client_token(&tx.customer).await.unwrap();
    assert!(before.is_some());

    assert!(processor.execute_transaction(&mut tx).await.unwrap());
    let vault_id = links.vault_id(tx.customer.id).await.unwrap().unwrap();

    let token = processor.client_token(&tx.customer).await.unwrap().unwrap();
    let envelope: serde_json::Value = serde_json::from_slice(
        &base64::engine::general_purpose::STANDARD
            .decode(token)
            .unwrap(),
    )
    .unwrap();
    assert_eq!(envelope["customerId"], vault_id.as_str());
}
