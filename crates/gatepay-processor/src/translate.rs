//! Gateway-reported transaction → host transaction state.

use gatepay_core::{CoreError, HostTransaction, TransactionState};
use gatepay_gateway::GatewayTransaction;

use crate::error::ProcessorError;
use crate::failure_codes::{failure_code, response_code};

/// Where a gateway status points the host transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Failed,
    Canceled,
    Settled,
}

impl Target {
    fn state(self) -> TransactionState {
        match self {
            Target::Failed => TransactionState::Failed,
            Target::Canceled => TransactionState::Canceled,
            Target::Settled => TransactionState::Settled,
        }
    }

    /// Value reported to the caller once the target is reached.
    fn outcome(self) -> bool {
        matches!(self, Target::Settled)
    }
}

fn target_for(result: &GatewayTransaction) -> Option<Target> {
    let status = result.status;
    if status.is_failure() {
        Some(Target::Failed)
    } else if status.is_voided() {
        Some(Target::Canceled)
    } else if status.is_settlement() {
        Some(Target::Settled)
    } else {
        None
    }
}

/// Record the gateway status on `transaction`, drive the matching
/// transition and persist.
///
/// The transaction is saved in every branch, including a refused one.
/// A transaction already in the target state is left alone and reported
/// as `false`, whatever that state is.
pub(crate) async fn update_transaction_status(
    transaction: &mut dyn HostTransaction,
    result: &GatewayTransaction,
) -> Result<bool, ProcessorError> {
    transaction.set_external_reference(result.id.clone());
    transaction.data_mut().status = Some(result.status.as_str().to_string());

    let outcome = apply_status(transaction, result);
    transaction.save().await?;
    outcome
}

fn apply_status(
    transaction: &mut dyn HostTransaction,
    result: &GatewayTransaction,
) -> Result<bool, ProcessorError> {
    let Some(target) = target_for(result) else {
        tracing::debug!(
            transaction_id = %transaction.id(),
            status = result.status.as_str(),
            "Gateway transaction still in flight"
        );
        return Ok(true);
    };

    let from = transaction.state();
    if from == target.state() {
        tracing::debug!(
            transaction_id = %transaction.id(),
            state = %from,
            status = result.status.as_str(),
            "Transaction already in target state"
        );
        return Ok(false);
    }

    let transition = match target {
        Target::Failed => {
            let detail = response_code(result).map(|code| code.to_string());
            transaction.fail(Some(failure_code(result)), detail)
        }
        Target::Canceled => transaction.cancel(),
        Target::Settled => transaction.settle(),
    };

    match transition {
        Ok(()) => {
            tracing::info!(
                transaction_id = %transaction.id(),
                %from,
                to = %target.state(),
                status = result.status.as_str(),
                "Transaction state updated from gateway"
            );
            Ok(target.outcome())
        }
        Err(CoreError::TransitionNotAllowed { .. }) => {
            tracing::warn!(
                transaction_id = %transaction.id(),
                initial_state = %from,
                target_state = %target.state(),
                status = result.status.as_str(),
                "Transaction state transition not allowed"
            );
            Err(ProcessorError::TransitionRefused {
                transaction_id: transaction.id(),
                from,
                target: target.state(),
            })
        }
        Err(e) => Err(e.into()),
    }
}
