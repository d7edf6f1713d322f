use crate::state_machine::{TransactionEvent, TransactionState};

/// Host-side errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("transition {event} not allowed from state {from}")]
    TransitionNotAllowed {
        from: TransactionState,
        event: TransactionEvent,
    },

    #[error("persistence error: {0}")]
    Persistence(String),
}

impl CoreError {
    /// Whether the host state machine refused a transition.
    pub fn is_transition_refusal(&self) -> bool {
        matches!(self, Self::TransitionNotAllowed { .. })
    }
}
