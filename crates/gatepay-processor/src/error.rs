use gatepay_core::{CoreError, TransactionState};
use gatepay_gateway::GatewayError;
use uuid::Uuid;

/// Processor errors.
#[derive(Debug, thiserror::Error)]
pub enum ProcessorError {
    /// The gateway demanded a transition the host state machine refused.
    #[error("transaction {transaction_id} cannot move from {from} to {target}")]
    TransitionRefused {
        transaction_id: Uuid,
        from: TransactionState,
        target: TransactionState,
    },

    #[error("host error: {0}")]
    Host(#[from] CoreError),

    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("processor not registered: {0}")]
    ProcessorNotFound(String),
}
