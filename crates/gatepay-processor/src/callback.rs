//! Checkout callback: the browser posts a nonce back for a transaction.

use gatepay_core::{HostTransaction, Secret};
use serde::Deserialize;

use crate::error::ProcessorError;
use crate::processor::{fail_ignoring_refusal, GatewayProcessor};

/// Form fields posted by the checkout page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackFields {
    #[serde(default)]
    pub payment_method_nonce: Option<Secret>,
    #[serde(default)]
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackOutcome {
    MissingNonce,
    NonceAlreadyPresent,
    /// The method already holds a reusable token.
    TokenAlreadyPresent,
    Charged,
    ChargeFailed,
}

impl CallbackOutcome {
    /// Whether the callback was rejected before any charge was attempted.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            CallbackOutcome::MissingNonce
                | CallbackOutcome::NonceAlreadyPresent
                | CallbackOutcome::TokenAlreadyPresent
        )
    }

    /// Reason recorded on the failed transaction for a rejected callback.
    pub fn fail_reason(&self) -> Option<&'static str> {
        match self {
            CallbackOutcome::MissingNonce => Some("payment_method_nonce was not provided."),
            CallbackOutcome::NonceAlreadyPresent => Some("Payment method already has a nonce."),
            CallbackOutcome::TokenAlreadyPresent => Some("Payment method already has a token."),
            CallbackOutcome::Charged | CallbackOutcome::ChargeFailed => None,
        }
    }

    /// Body returned to the checkout page.
    pub fn message(&self) -> &'static str {
        match self {
            CallbackOutcome::MissingNonce => "The payment method nonce was not provided.",
            CallbackOutcome::NonceAlreadyPresent => {
                "The payment method already has a payment method nonce."
            }
            CallbackOutcome::TokenAlreadyPresent => {
                "The payment method already has a payment method token."
            }
            CallbackOutcome::Charged => "All is well!",
            CallbackOutcome::ChargeFailed => "Something went wrong!",
        }
    }
}

impl GatewayProcessor {
    /// Store the posted nonce on the transaction's payment method and charge it.
    ///
    /// Rejected callbacks and failed charges fail the transaction.
    pub async fn handle_transaction_response(
        &self,
        transaction: &mut dyn HostTransaction,
        fields: CallbackFields,
    ) -> Result<CallbackOutcome, ProcessorError> {
        let nonce = fields.payment_method_nonce.filter(|nonce| !nonce.is_empty());
        let existing = transaction.payment_method().data();
        let rejection = match nonce {
            None => Some(CallbackOutcome::MissingNonce),
            Some(_) if existing.nonce.is_some() => Some(CallbackOutcome::NonceAlreadyPresent),
            Some(_) if existing.token.is_some() => Some(CallbackOutcome::TokenAlreadyPresent),
            Some(_) => None,
        };
        if let Some(outcome) = rejection {
            tracing::warn!(
                transaction_id = %transaction.id(),
                reason = outcome.message(),
                "Rejected checkout callback"
            );
            let reason = outcome.fail_reason().map(str::to_owned);
            fail_ignoring_refusal(transaction, None, reason).await?;
            return Ok(outcome);
        }

        let payment_method = transaction.payment_method_mut();
        let data = payment_method.data_mut();
        data.nonce = nonce;
        if let Some(postal_code) = fields.postal_code.filter(|code| !code.is_empty()) {
            data.details.postal_code = Some(postal_code);
        }
        payment_method.save().await?;

        if self.execute_transaction(transaction).await? {
            return Ok(CallbackOutcome::Charged);
        }

        fail_ignoring_refusal(transaction, None, None).await?;
        Ok(CallbackOutcome::ChargeFailed)
    }
}
