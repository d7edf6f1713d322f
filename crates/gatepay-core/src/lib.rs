//! Gatepay core
//!
//! Host-side contracts consumed by the gateway processor: the transaction
//! state machine, the semi-structured payloads stored on transactions and
//! payment methods, the host capability traits, and serde-backed reference
//! records implementing those traits.

pub mod error;
pub mod types;
pub mod state_machine;
pub mod host;
pub mod records;

pub use error::CoreError;
pub use host::{HostCustomer, HostPaymentMethod, HostTransaction};
pub use records::{
    CustomerRecord, PaymentMethodRecord, RecordSink, SaveJournal, SavedRecord, TransactionRecord,
};
pub use state_machine::{TransactionEvent, TransactionState, TransactionStateMachine};
pub use types::{
    Amount, FailureCode, InstrumentDetails, InstrumentType, PaymentMethodData, Secret,
    TransactionData,
};
