use std::sync::Arc;

use gatepay_core::{CoreError, FailureCode, HostCustomer, HostTransaction, TransactionState};
use gatepay_gateway::{ClientTokenRequest, Gateway};

use crate::config::{ProcessorConfig, RefusalPolicy};
use crate::error::ProcessorError;
use crate::vault::VaultLinks;

/// Drives host transactions through one gateway.
///
/// The gateway client is shared between processors; each processor carries
/// its own name, recurring flag and refusal policy.
pub struct GatewayProcessor {
    pub(crate) config: ProcessorConfig,
    pub(crate) gateway: Arc<dyn Gateway>,
    pub(crate) vault_links: Arc<dyn VaultLinks>,
}

impl GatewayProcessor {
    pub fn new(
        config: ProcessorConfig,
        gateway: Arc<dyn Gateway>,
        vault_links: Arc<dyn VaultLinks>,
    ) -> Self {
        tracing::info!(
            processor = %config.name,
            recurring = config.recurring,
            gateway = gateway.gateway_id(),
            "Processor created"
        );
        Self {
            config,
            gateway,
            vault_links,
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn is_recurring(&self) -> bool {
        self.config.recurring
    }

    pub fn refusal_policy(&self) -> RefusalPolicy {
        self.config.on_transition_refused
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub(crate) fn owns(&self, transaction: &dyn HostTransaction) -> bool {
        transaction.processor() == self.config.name
    }

    /// Move an `Initial` transaction to `Pending` and charge it.
    ///
    /// Returns `Ok(false)` for a transaction of another processor, one not
    /// in `Initial`, or one the host refuses to process.
    pub async fn execute_transaction(
        &self,
        transaction: &mut dyn HostTransaction,
    ) -> Result<bool, ProcessorError> {
        if !self.owns(transaction) {
            tracing::debug!(
                transaction_id = %transaction.id(),
                processor = %self.config.name,
                owner = %transaction.processor(),
                "Transaction belongs to another processor"
            );
            return Ok(false);
        }
        if transaction.state() != TransactionState::Initial {
            return Ok(false);
        }

        match transaction.process() {
            Ok(()) => {}
            Err(e) if e.is_transition_refusal() => {
                tracing::warn!(transaction_id = %transaction.id(), error = %e, "Host refused to process transaction");
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        }
        transaction.save().await?;

        self.charge_transaction(transaction).await
    }

    /// Generate a client token, scoped to the customer's vault id if linked.
    ///
    /// Gateway communication failures are logged and yield `None`.
    pub async fn client_token(
        &self,
        customer: &dyn HostCustomer,
    ) -> Result<Option<String>, ProcessorError> {
        let customer_id = self.vault_links.vault_id(customer.id()).await?;
        let request = ClientTokenRequest { customer_id };

        match self.gateway.generate_client_token(request).await {
            Ok(token) => Ok(Some(token)),
            Err(e) if e.is_communication_failure() => {
                tracing::warn!(
                    customer_id = %customer.id(),
                    error = %e,
                    "Couldn't obtain client token from gateway"
                );
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Apply the configured refusal policy to a translator outcome.
    pub(crate) fn apply_refusal_policy(
        &self,
        outcome: Result<bool, ProcessorError>,
    ) -> Result<bool, ProcessorError> {
        match outcome {
            Err(ProcessorError::TransitionRefused {
                transaction_id,
                from,
                target,
            }) if self.config.on_transition_refused == RefusalPolicy::Suppress => {
                tracing::debug!(%transaction_id, %from, %target, "Suppressed refused transition");
                Ok(false)
            }
            other => other,
        }
    }
}

/// Fail `transaction` and persist it, logging a refusal instead of returning it.
pub(crate) async fn fail_ignoring_refusal(
    transaction: &mut dyn HostTransaction,
    fail_code: Option<FailureCode>,
    fail_reason: Option<String>,
) -> Result<(), ProcessorError> {
    match transaction.fail(fail_code, fail_reason) {
        Ok(()) => {}
        Err(CoreError::TransitionNotAllowed { from, event }) => {
            tracing::warn!(
                transaction_id = %transaction.id(),
                %from,
                %event,
                "Couldn't fail transaction"
            );
        }
        Err(e) => return Err(e.into()),
    }
    transaction.save().await?;
    Ok(())
}
