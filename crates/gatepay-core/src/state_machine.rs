use std::fmt;

use crate::error::CoreError;

/// The states of a billing transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionState {
    /// Created by the host, not yet submitted to the gateway.
    Initial,
    /// Submitted; the gateway has not reached a final outcome.
    Pending,
    /// Funds captured. Final state.
    Settled,
    /// Declined, rejected or otherwise failed. Final state.
    Failed,
    /// Voided before settlement. Final state.
    Canceled,
}

impl TransactionState {
    /// Whether this is a final (terminal) state.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Settled | Self::Failed | Self::Canceled)
    }
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initial => write!(f, "initial"),
            Self::Pending => write!(f, "pending"),
            Self::Settled => write!(f, "settled"),
            Self::Failed => write!(f, "failed"),
            Self::Canceled => write!(f, "canceled"),
        }
    }
}

/// Events that trigger state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionEvent {
    /// The transaction was handed to the gateway.
    Process,
    /// The gateway reported the funds as settled or settling.
    Settle,
    /// The charge failed.
    Fail,
    /// The charge was voided.
    Cancel,
}

impl fmt::Display for TransactionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Process => write!(f, "process"),
            Self::Settle => write!(f, "settle"),
            Self::Fail => write!(f, "fail"),
            Self::Cancel => write!(f, "cancel"),
        }
    }
}

/// Transaction lifecycle used by the reference host records.
///
/// Valid transitions:
/// - Initial → Pending (Process)
/// - Initial → Failed (Fail)
/// - Initial → Canceled (Cancel)
/// - Pending → Settled (Settle)
/// - Pending → Failed (Fail)
/// - Pending → Canceled (Cancel)
pub struct TransactionStateMachine;

impl TransactionStateMachine {
    /// Attempt a state transition based on an event.
    /// Returns the new state on success, or `TransitionNotAllowed`.
    pub fn transition(
        current: TransactionState,
        event: TransactionEvent,
    ) -> Result<TransactionState, CoreError> {
        let new_state = match (current, event) {
            (TransactionState::Initial, TransactionEvent::Process) => TransactionState::Pending,

            (
                TransactionState::Initial | TransactionState::Pending,
                TransactionEvent::Fail,
            ) => TransactionState::Failed,
            (
                TransactionState::Initial | TransactionState::Pending,
                TransactionEvent::Cancel,
            ) => TransactionState::Canceled,

            (TransactionState::Pending, TransactionEvent::Settle) => TransactionState::Settled,

            _ => {
                return Err(CoreError::TransitionNotAllowed {
                    from: current,
                    event,
                })
            }
        };

        tracing::debug!(
            from = %current,
            to = %new_state,
            event = %event,
            "transaction state transition"
        );

        Ok(new_state)
    }

    /// Check if a transition is valid without performing it.
    pub fn can_transition(current: TransactionState, event: TransactionEvent) -> bool {
        Self::transition(current, event).is_ok()
    }
}
