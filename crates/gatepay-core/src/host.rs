use async_trait::async_trait;
use uuid::Uuid;

use crate::error::CoreError;
use crate::state_machine::TransactionState;
use crate::types::{Amount, FailureCode, PaymentMethodData, TransactionData};

/// A billing customer as seen by the processor.
pub trait HostCustomer: Send + Sync {
    fn id(&self) -> Uuid;
    fn first_name(&self) -> &str;
    fn last_name(&self) -> &str;
}

/// A host payment method carrying the gateway payload.
#[async_trait]
pub trait HostPaymentMethod: Send + Sync {
    fn id(&self) -> Uuid;

    /// Canceled methods must never be charged.
    fn canceled(&self) -> bool;

    fn data(&self) -> &PaymentMethodData;
    fn data_mut(&mut self) -> &mut PaymentMethodData;

    fn verified(&self) -> bool;
    fn set_verified(&mut self, verified: bool);

    /// Persist the method.
    async fn save(&mut self) -> Result<(), CoreError>;
}

/// A host transaction driven by the processor.
///
/// The transition methods belong to the host's state machine; each may
/// refuse with [`CoreError::TransitionNotAllowed`]. Transitions only change
/// in-memory state until [`HostTransaction::save`] is called.
#[async_trait]
pub trait HostTransaction: Send + Sync {
    fn id(&self) -> Uuid;
    fn state(&self) -> TransactionState;
    fn amount(&self) -> &Amount;

    /// Name of the processor this transaction was created for.
    fn processor(&self) -> &str;

    fn data(&self) -> &TransactionData;
    fn data_mut(&mut self) -> &mut TransactionData;

    /// Gateway transaction id, once known.
    fn external_reference(&self) -> Option<&str>;
    fn set_external_reference(&mut self, reference: String);

    fn customer(&self) -> &dyn HostCustomer;
    fn payment_method(&self) -> &dyn HostPaymentMethod;
    fn payment_method_mut(&mut self) -> &mut dyn HostPaymentMethod;

    /// Initial → Pending.
    fn process(&mut self) -> Result<(), CoreError>;
    /// Pending → Settled.
    fn settle(&mut self) -> Result<(), CoreError>;
    /// Initial | Pending → Canceled.
    fn cancel(&mut self) -> Result<(), CoreError>;
    /// Initial | Pending → Failed, recording why.
    fn fail(
        &mut self,
        fail_code: Option<FailureCode>,
        fail_reason: Option<String>,
    ) -> Result<(), CoreError>;

    /// Persist the transaction.
    async fn save(&mut self) -> Result<(), CoreError>;
}
