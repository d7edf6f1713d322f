use gatepay_core::{HostTransaction, TransactionState};

use crate::error::ProcessorError;
use crate::processor::GatewayProcessor;
use crate::translate::update_transaction_status;

impl GatewayProcessor {
    /// Poll the gateway for a `Pending` transaction and apply what it reports.
    ///
    /// The transaction's own external reference is used; a transaction whose
    /// charge was interrupted before it was saved falls back to the reference
    /// recorded on its payment method.
    pub async fn fetch_transaction_status(
        &self,
        transaction: &mut dyn HostTransaction,
    ) -> Result<bool, ProcessorError> {
        if !self.owns(transaction) || transaction.state() != TransactionState::Pending {
            return Ok(false);
        }

        let reference = transaction
            .external_reference()
            .or(transaction
                .payment_method()
                .data()
                .gateway_reference_id
                .as_deref())
            .map(str::to_owned);
        let Some(reference) = reference else {
            tracing::warn!(
                transaction_id = %transaction.id(),
                "Couldn't find gateway reference for pending transaction"
            );
            return Ok(false);
        };

        let found = match self.gateway.find(&reference).await {
            Ok(found) => found,
            Err(e) if e.is_not_found() => {
                tracing::warn!(
                    transaction_id = %transaction.id(),
                    gateway_reference = %reference,
                    "Couldn't find gateway transaction"
                );
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };

        let outcome = update_transaction_status(transaction, &found).await;
        self.apply_refusal_policy(outcome)
    }
}
