//! Integration test: reconciling pending transactions with the gateway.
//!
//! Covers every gateway status family, the reference fallback used after an
//! interrupted charge, and registry routing.

use gatepay_core::{FailureCode, HostTransaction, TransactionRecord, TransactionState};
use gatepay_gateway::{GatewayError, GatewayStatus};
use gatepay_integration_tests::*;
use gatepay_processor::{ProcessorConfig, ProcessorError, RefusalPolicy};

/// A `Pending` transaction already charged as `gw1`.
fn pending() -> TransactionRecord {
    let (mut tx, _journal) = transaction(ONE_TIME, 1000);
    tx.process().unwrap();
    tx.external_reference = Some("gw1".into());
    tx
}

async fn poll(status: GatewayStatus) -> (bool, TransactionRecord) {
    let (processor, gateway, _links) = scripted(ProcessorConfig::new(ONE_TIME));
    gateway.push_find(Ok(gateway_transaction("gw1", status)));
    let mut tx = pending();
    let updated = processor.fetch_transaction_status(&mut tx).await.unwrap();
    (updated, tx)
}

// =========================================================================
// Status families
// =========================================================================

#[tokio::test]
async fn test_settlement_statuses_settle() {
    for status in [
        GatewayStatus::Settling,
        GatewayStatus::SettlementPending,
        GatewayStatus::Settled,
    ] {
        let (updated, tx) = poll(status).await;
        assert!(updated, "{status} should report success");
        assert_eq!(tx.state, TransactionState::Settled, "{status}");
        assert_eq!(tx.data.status.as_deref(), Some(status.as_str()));
    }
}

#[tokio::test]
async fn test_failure_statuses_fail() {
    for status in [
        GatewayStatus::AuthorizationExpired,
        GatewayStatus::SettlementDeclined,
        GatewayStatus::Failed,
        GatewayStatus::GatewayRejected,
        GatewayStatus::ProcessorDeclined,
    ] {
        let (updated, tx) = poll(status).await;
        assert!(!updated, "{status}");
        assert_eq!(tx.state, TransactionState::Failed, "{status}");
        assert_eq!(tx.fail_code, Some(FailureCode::Default), "{status}");
    }
}

#[tokio::test]
async fn test_voided_cancels() {
    let (updated, tx) = poll(GatewayStatus::Voided).await;
    assert!(!updated);
    assert_eq!(tx.state, TransactionState::Canceled);
}

#[tokio::test]
async fn test_in_flight_statuses_leave_transaction_pending() {
    for status in [
        GatewayStatus::Authorized,
        GatewayStatus::Authorizing,
        GatewayStatus::SubmittedForSettlement,
        GatewayStatus::SettlementFailed,
        GatewayStatus::SettlementConfirmed,
        GatewayStatus::Unrecognized,
    ] {
        let (updated, tx) = poll(status).await;
        assert!(updated, "{status}");
        assert_eq!(tx.state, TransactionState::Pending, "{status}");
    }
}

#[tokio::test]
async fn test_decline_codes_pick_failure_code() {
    let (processor, gateway, _links) = scripted(ProcessorConfig::new(ONE_TIME));
    let mut declined = gateway_transaction("gw1", GatewayStatus::ProcessorDeclined);
    declined.processor_response_code = Some(2004);
    gateway.push_find(Ok(declined));

    let mut tx = pending();
    assert!(!processor.fetch_transaction_status(&mut tx).await.unwrap());
    assert_eq!(tx.fail_code, Some(FailureCode::ExpiredCard));

    let mut settlement = gateway_transaction("gw2", GatewayStatus::SettlementDeclined);
    settlement.processor_settlement_response_code = Some(2001);
    gateway.push_find(Ok(settlement));

    let mut tx = pending();
    assert!(!processor.fetch_transaction_status(&mut tx).await.unwrap());
    assert_eq!(tx.fail_code, Some(FailureCode::InsufficientFunds));
    assert_eq!(tx.external_reference.as_deref(), Some("gw2"));
}

// =========================================================================
// References and errors
// =========================================================================

#[tokio::test]
async fn test_falls_back_to_payment_method_reference() {
    let (processor, gateway, _links) = scripted(ProcessorConfig::new(ONE_TIME));
    gateway.push_find(Ok(gateway_transaction("gw9", GatewayStatus::Settled)));

    let mut tx = pending();
    tx.external_reference = None;
    tx.payment_method.data.gateway_reference_id = Some("gw9".into());

    assert!(processor.fetch_transaction_status(&mut tx).await.unwrap());
    assert_eq!(gateway.find_requests(), vec!["gw9".to_string()]);
    assert_eq!(tx.external_reference.as_deref(), Some("gw9"));
    assert_eq!(tx.state, TransactionState::Settled);
}

#[tokio::test]
async fn test_without_reference_nothing_is_fetched() {
    let (processor, gateway, _links) = scripted(ProcessorConfig::new(ONE_TIME));
    let mut tx = pending();
    tx.external_reference = None;

    assert!(!processor.fetch_transaction_status(&mut tx).await.unwrap());
    assert_eq!(gateway.call_count(), 0);
    assert_eq!(tx.state, TransactionState::Pending);
}

#[tokio::test]
async fn test_only_pending_transactions_are_polled() {
    let (processor, gateway, _links) = scripted(ProcessorConfig::new(ONE_TIME));
    let (mut tx, _journal) = transaction(ONE_TIME, 1000);
    tx.external_reference = Some("gw1".into());

    assert!(!processor.fetch_transaction_status(&mut tx).await.unwrap());
    assert_eq!(gateway.call_count(), 0);
}

#[tokio::test]
async fn test_unknown_gateway_transaction_is_not_an_error() {
    let (processor, gateway, _links) = scripted(ProcessorConfig::new(ONE_TIME));
    gateway.push_find(Err(GatewayError::NotFound("gw1".into())));

    let mut tx = pending();
    assert!(!processor.fetch_transaction_status(&mut tx).await.unwrap());
    assert_eq!(tx.state, TransactionState::Pending);
}

#[tokio::test]
async fn test_gateway_outage_propagates() {
    let (processor, gateway, _links) = scripted(ProcessorConfig::new(ONE_TIME));
    gateway.push_find(Err(GatewayError::DownForMaintenance));

    let mut tx = pending();
    let err = processor.fetch_transaction_status(&mut tx).await.unwrap_err();
    assert!(matches!(
        err,
        ProcessorError::Gateway(GatewayError::DownForMaintenance)
    ));
    assert_eq!(tx.state, TransactionState::Pending);
}

#[tokio::test]
async fn test_suppress_policy_still_polls() {
    let (processor, gateway, _links) =
        scripted(ProcessorConfig::new(ONE_TIME).on_transition_refused(RefusalPolicy::Suppress));
    gateway.push_find(Ok(gateway_transaction("gw1", GatewayStatus::Settled)));

    let mut tx = pending();
    assert!(processor.fetch_transaction_status(&mut tx).await.unwrap());
    assert_eq!(tx.state, TransactionState::Settled);
}

// =========================================================================
// Registry routing
// =========================================================================

#[tokio::test]
async fn test_sandbox_void_and_forget() {
    let (registry, gateway, _links) = sandbox();
    let (tx, _journal) = transaction(ONE_TIME, 1000);
    let mut voided = with_nonce(tx, gatepay_gateway::adapters::sandbox::nonces::VALID_CARD);
    assert!(registry.execute_transaction(&mut voided).await.unwrap());

    let reference = voided.external_reference.clone().unwrap();
    gateway.set_status(&reference, GatewayStatus::Voided).unwrap();
    assert!(!registry.fetch_transaction_status(&mut voided).await.unwrap());
    assert_eq!(voided.state, TransactionState::Canceled);

    let (tx, _journal) = transaction(ONE_TIME, 1000);
    let mut lost = with_nonce(tx, gatepay_gateway::adapters::sandbox::nonces::VALID_VISA);
    assert!(registry.execute_transaction(&mut lost).await.unwrap());
    gateway.forget(lost.external_reference.as_deref().unwrap());
    assert!(!registry.fetch_transaction_status(&mut lost).await.unwrap());
    assert_eq!(lost.state, TransactionState::Pending);
}

#[tokio::test]
async fn test_registry_rejects_unknown_processor() {
    let (registry, _gateway, _links) = sandbox();
    let (mut tx, _journal) = transaction("manual", 1000);

    let err = registry.fetch_transaction_status(&mut tx).await.unwrap_err();
    assert!(matches!(err, ProcessorError::ProcessorNotFound(name) if name == "manual"));
    assert_eq!(tx.state(), TransactionState::Initial);
}
