//! Gateway response codes → host failure codes.

use gatepay_core::FailureCode;
use gatepay_gateway::{GatewayStatus, GatewayTransaction};

/// First matching row wins; 2022 therefore maps to `ExpiredPaymentMethod`.
const FAILURE_TABLE: &[(&[u32], FailureCode)] = &[
    (&[2001], FailureCode::InsufficientFunds),
    (&[2022], FailureCode::ExpiredPaymentMethod),
    (&[2004, 2022], FailureCode::ExpiredCard),
    (&[2071, 2072, 2073], FailureCode::InvalidPaymentMethod),
    (&[2005, 2006], FailureCode::InvalidCard),
    (&[2002, 2003, 2086], FailureCode::LimitExceeded),
    (
        &[2000, 2010, 2019, 2038, 2046, 2061, 2062, 2064],
        FailureCode::TransactionDeclinedByBank,
    ),
    (&[2075, 2076, 2077], FailureCode::TransactionHardDeclined),
    (
        &[2012, 2013, 2014, 2074],
        FailureCode::TransactionHardDeclinedByBank,
    ),
];

/// Map a gateway response code to a failure code.
pub fn failure_code_for(code: Option<u32>) -> FailureCode {
    let Some(code) = code else {
        return FailureCode::Default;
    };
    FAILURE_TABLE
        .iter()
        .find(|(codes, _)| codes.contains(&code))
        .map(|(_, failure)| *failure)
        .unwrap_or(FailureCode::Default)
}

/// The response code relevant to the transaction's status.
pub fn response_code(transaction: &GatewayTransaction) -> Option<u32> {
    match transaction.status {
        GatewayStatus::ProcessorDeclined | GatewayStatus::AuthorizationExpired => {
            transaction.processor_response_code
        }
        GatewayStatus::SettlementDeclined | GatewayStatus::SettlementFailed => {
            transaction.processor_settlement_response_code
        }
        _ => None,
    }
}

pub fn failure_code(transaction: &GatewayTransaction) -> FailureCode {
    failure_code_for(response_code(transaction))
}
